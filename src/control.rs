/// User actions typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Calibrate,
    Pause,
    Resume,
    Quit,
}

impl Control {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "c" | "calibrate" => Some(Control::Calibrate),
            "p" | "pause" => Some(Control::Pause),
            "r" | "resume" => Some(Control::Resume),
            "q" | "quit" => Some(Control::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str = "Commands: c = calibrate, p = pause, r = resume, q = quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(Control::parse("c"), Some(Control::Calibrate));
        assert_eq!(Control::parse(" Pause \n"), Some(Control::Pause));
        assert_eq!(Control::parse("r"), Some(Control::Resume));
        assert_eq!(Control::parse("QUIT"), Some(Control::Quit));
        assert_eq!(Control::parse("zero"), None);
    }
}
