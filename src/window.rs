/// Compute a periodic Hann (raised cosine) window.
///
/// # Arguments
/// * `n` - Window length
pub fn hann(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Compute a Hamming window.
///
/// # Arguments
/// * `n` - Window length
pub fn hamming(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Compute a cosine (sine half-period) window.
///
/// This is the analysis window the separation pipeline defaults to: a
/// gentle taper whose squared overlap at hop = n/4 sums to a constant,
/// which keeps the masked inverse transform free of frame-rate ripple.
///
/// # Arguments
/// * `n` - Window length
pub fn cosine(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| (std::f32::consts::PI * (i as f32 + 0.5) / m).sin())
        .collect()
}

/// Window type specification for [`get_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Hann,
    Hamming,
    Cosine,
}

impl WindowType {
    /// Parse a window type from a string (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "hann" | "hanning" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "cosine" | "sine" => Some(WindowType::Cosine),
            _ => None,
        }
    }
}

/// Get a window of the specified type and length.
pub fn get_window(window: WindowType, n: usize) -> Vec<f32> {
    match window {
        WindowType::Hann => hann(n),
        WindowType::Hamming => hamming(n),
        WindowType::Cosine => cosine(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hann_endpoints() {
        let w = hann(8);
        assert_eq!(w.len(), 8);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-6);
        // Periodic window: peak at n/2.
        assert_relative_eq!(w[4], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_symmetry() {
        let w = cosine(16);
        for i in 0..8 {
            assert_relative_eq!(w[i], w[15 - i], epsilon = 1e-6);
        }
        assert!(w.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(WindowType::parse("Hann"), Some(WindowType::Hann));
        assert_eq!(WindowType::parse("sine"), Some(WindowType::Cosine));
        assert_eq!(WindowType::parse("boxcar"), None);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(hann(0).is_empty());
        assert_eq!(cosine(1), vec![1.0]);
    }
}
