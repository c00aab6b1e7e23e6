//! Extension-to-language table used when a file is created from a change record

/// Language tag for a file name, `plaintext` when the extension is unknown
pub fn language_for(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "plaintext",
    };

    match ext.as_str() {
        "html" => "html",
        "css" => "css",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "json" => "json",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_for("index.html"), "html");
        assert_eq!(language_for("style.css"), "css");
        assert_eq!(language_for("app.jsx"), "javascript");
        assert_eq!(language_for("main.ts"), "typescript");
        assert_eq!(language_for("view.tsx"), "typescript");
        assert_eq!(language_for("package.json"), "json");
    }

    #[test]
    fn test_case_insensitive_extension() {
        assert_eq!(language_for("SCRIPT.JS"), "javascript");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(language_for("Makefile"), "plaintext");
        assert_eq!(language_for("notes.md"), "plaintext");
        assert_eq!(language_for("archive.tar.gz"), "plaintext");
    }
}
