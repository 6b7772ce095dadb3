const REQUIREMENTS: &str = "
Other Requirements:
- Output only the code.
- No <html>, <head>, <body>, <script>, <link>, <footer> or <style> tags and word
- No markdown or explanation.
- No need to add any other text or explanation.

Code/snippet:

";

/// User instruction, the fixed output requirements, then the snippet.
pub fn build_prompt(instruction: &str, snippet: &str) -> String {
    let mut prompt = String::with_capacity(instruction.len() + REQUIREMENTS.len() + snippet.len());
    prompt.push_str(instruction);
    prompt.push_str(REQUIREMENTS);
    prompt.push_str(snippet);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_comes_first_and_snippet_last() {
        let prompt = build_prompt("Make the button blue", "<button>Go</button>");
        assert!(prompt.starts_with("Make the button blue\n"));
        assert!(prompt.ends_with("Code/snippet:\n\n<button>Go</button>"));
        assert!(prompt.contains("- Output only the code."));
        assert!(prompt.contains("- No markdown or explanation."));
    }
}
