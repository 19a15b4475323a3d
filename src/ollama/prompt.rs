const SYSTEM_TEMPLATE: &str = "You are a helpful coding assistant. When providing code examples:
1. Always use proper markdown formatting with language-specific syntax highlighting
2. Use triple backticks with the language name for code blocks (e.g. \"```python\")
3. Format code in a clean, readable way with proper indentation
4. Use VSCode-style syntax highlighting conventions

User Query: {query}
";

/// Wrap a raw user message in the coding-assistant instructions
pub fn format_prompt(query: &str) -> String {
    SYSTEM_TEMPLATE.replacen("{query}", query, 1)
}
