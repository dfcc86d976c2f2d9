//! Transient user-facing status lines

/// Render a success line
pub fn success_line(message: &str) -> String {
    format!("✅ {message}")
}

/// Render a failure line
pub fn failure_line(message: &str) -> String {
    format!("❌ {message}")
}

pub fn notify_success(message: &str) {
    println!("{}", success_line(message));
}

pub fn notify_failure(message: &str) {
    eprintln!("{}", failure_line(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        assert_eq!(success_line("Reminder added"), "✅ Reminder added");
        assert_eq!(failure_line("Server said no"), "❌ Server said no");
    }
}
