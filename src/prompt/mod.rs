fn base_rules() -> &'static str {
    r#"You are an expert developer. Generate code following these rules:
1. Return ONLY the code block, no text before/after
2. Use a single code block with the specified language
3. No nested blocks or extra language tags
4. No explanatory text or comments
5. Follow language conventions
6. For NightyScripts:
   - Include @nightyScript decorator with metadata
   - Add proper docstring with COMMANDS/EXAMPLES/NOTES
   - Add command descriptions
   - Include error handling
   - Add required imports
7. ALWAYS add a unique_script_function() at the end to call the script and not interfere with other scripts

Example:
```python
import json
import discord

@nightyScript(
    name="Script Name",
    author="thedorekaczynski",
    description="Description",
    usage="<p>command"
)
def unique_script_function():
    """
    SCRIPT NAME
    ----------
    Description

    COMMANDS:
    <p>command - Description

    EXAMPLES:
    <p>command - Example

    NOTES:
    - Important notes
    """
    @bot.command(
        name="command",
        description="Description"
    )
    async def command_handler(ctx, *, args: str):
        try:
            # Command logic
            await ctx.send("Result")
        except Exception as e:
            await ctx.send(f"Error: {e}")

unique_script_function()
```"#
}

fn ui_rules() -> &'static str {
    r#"UI-ONLY MODE (additional rules):
8. Do NOT implement text commands or chat-command handling of any kind
9. All interaction goes through UI elements: buttons, inputs, selects, toasts
10. Register every UI element through the UI documentation below; never invent widget APIs
11. Surface results and errors as toasts or panel updates, never as chat messages"#
}

/// Full instruction string for a fresh generation.
pub fn generation_prompt(
    context: &str,
    ui_docs: Option<&str>,
    user_prompt: &str,
    language: Option<&str>,
) -> String {
    let language = language.unwrap_or("python");
    let mut out = String::from(base_rules());
    if let Some(docs) = ui_docs {
        out.push_str("\n\n");
        out.push_str(ui_rules());
        out.push_str("\n\nUI documentation:\n---\n");
        out.push_str(docs);
        out.push_str("\n---");
    }
    out.push_str("\n\nContext:\n---\n");
    out.push_str(context);
    out.push_str("\n---\n\nPrompt: ");
    out.push_str(user_prompt);
    out.push_str(&format!(
        "\n\nGenerate {language} code. Return ONLY the code block."
    ));
    out
}

/// Fix variant: same rule set, original code attached for correction.
pub fn fix_prompt(
    context: &str,
    ui_docs: Option<&str>,
    user_prompt: &str,
    original_code: &str,
    language: Option<&str>,
) -> String {
    let language = language.unwrap_or("python");
    let mut out = String::from(base_rules());
    if let Some(docs) = ui_docs {
        out.push_str("\n\n");
        out.push_str(ui_rules());
        out.push_str("\n\nUI documentation:\n---\n");
        out.push_str(docs);
        out.push_str("\n---");
    }
    out.push_str("\n\nContext:\n---\n");
    out.push_str(context);
    out.push_str("\n---\n\nThis code needs to be fixed:\n```");
    out.push_str(language);
    out.push('\n');
    out.push_str(original_code);
    out.push_str("\n```\n\nProblem: ");
    out.push_str(user_prompt);
    out.push_str(&format!(
        "\n\nReturn the corrected {language} code as a single code block. Return ONLY the code block."
    ));
    out
}
