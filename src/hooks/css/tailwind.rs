//! Tailwind-style CLI arguments: `command -i input -o output [--minify]`

use std::path::Path;

/// Append input/output (and `--minify`) to the configured command.
pub fn expand(command: &[String], input: &Path, output: &Path, minify: bool) -> Vec<String> {
    let mut expanded = command.to_vec();
    expanded.extend([
        "-i".into(),
        input.display().to_string(),
        "-o".into(),
        output.display().to_string(),
    ]);
    if minify {
        expanded.push("--minify".into());
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand() {
        let cmd = vec!["npx".to_string(), "tailwindcss".to_string()];
        let args = expand(&cmd, Path::new("/t/in.css"), Path::new("/t/out.css"), true);
        assert_eq!(
            args,
            ["npx", "tailwindcss", "-i", "/t/in.css", "-o", "/t/out.css", "--minify"]
        );
        assert!(!expand(&cmd, Path::new("a"), Path::new("b"), false).contains(&"--minify".to_string()));
    }
}
