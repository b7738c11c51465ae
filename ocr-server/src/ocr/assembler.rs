use tracing::debug;

use super::engine::{Detection, RecognitionResult};

/// Join recognized lines into one newline-separated block.
///
/// Lines keep engine order and their text as reported. Malformed detections
/// and blank lines are skipped, and only the final block is trimmed, so an
/// image without text yields `""`.
pub fn assemble(result: &RecognitionResult) -> String {
    let mut text = String::new();

    for detection in result.detections() {
        match detection {
            Detection::Line(line) => {
                if line.text.trim().is_empty() {
                    continue;
                }
                text.push_str(&line.text);
                text.push('\n');
            }
            Detection::Malformed { reason } => {
                debug!(%reason, "Skipping malformed detection");
            }
        }
    }

    text.trim().to_string()
}
