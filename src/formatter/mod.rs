pub struct Formatter {}

impl Formatter {
    pub fn format_size(size: u64, precision: u8) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

        let mut size_float = size as f64;
        let mut unit = 0;
        while size_float > 1024.0 && unit < UNITS.len() - 1 {
            size_float /= 1024.0;
            unit += 1;
        }

        format!(
            "{number:.prec$} {unit}",
            number = size_float,
            prec = precision as usize,
            unit = UNITS[unit]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(Formatter::format_size(512, 1), "512.0 B");
        assert_eq!(Formatter::format_size(2048, 1), "2.0 KB");
        assert_eq!(Formatter::format_size(5 * 1024 * 1024, 2), "5.00 MB");
        assert_eq!(
            Formatter::format_size(3 * 1024 * 1024 * 1024 * 1024 * 1024, 0),
            "3072 TB"
        );
    }
}
