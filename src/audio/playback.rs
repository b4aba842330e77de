use crate::{LucidError, Result};
use std::io::BufReader;
use std::path::Path;

/// Play an audio file to completion on the default output device.
///
/// Blocks the calling thread until playback ends; callers queue this on the
/// task pool rather than the UI thread.
pub fn play_file(path: &Path) -> Result<()> {
    let (_stream, handle) = rodio::OutputStream::try_default()
        .map_err(|e| LucidError::AudioDevice(format!("No output device: {}", e)))?;
    let sink = rodio::Sink::try_new(&handle)
        .map_err(|e| LucidError::AudioDevice(format!("Failed to create sink: {}", e)))?;

    let file = std::fs::File::open(path)?;
    let source = rodio::Decoder::new(BufReader::new(file))
        .map_err(|e| LucidError::AudioDevice(format!("Failed to decode {:?}: {}", path, e)))?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = play_file(Path::new("no/such/cue.mp3")).unwrap_err();
        // Depending on the environment the device or the file fails first.
        assert!(matches!(
            err,
            LucidError::Io(_) | LucidError::AudioDevice(_)
        ));
    }
}
