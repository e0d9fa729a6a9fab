use crate::{Error, Result};

/// Validate that an audio buffer is non-empty and fully finite.
///
/// Every entry point taking a time-domain signal funnels through this
/// guard so NaN/Inf input is rejected before it can poison a spectrogram.
pub fn valid_audio(y: &[f32]) -> Result<()> {
    if y.is_empty() {
        return Err(Error::EmptyAudio);
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteAudio);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_audio_ok() {
        assert!(valid_audio(&[0.0, 0.5, -0.5]).is_ok());
    }

    #[test]
    fn test_valid_audio_empty() {
        assert!(matches!(valid_audio(&[]), Err(Error::EmptyAudio)));
    }

    #[test]
    fn test_valid_audio_nan() {
        assert!(matches!(
            valid_audio(&[0.0, f32::NAN]),
            Err(Error::NonFiniteAudio)
        ));
    }
}
