//! General REPL commands (help, quit, lang)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use repcue_core::Language;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `lang [tag]` command
pub fn cmd_lang(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Cue language: {}", ctx.language));
    }

    let Some(language) = Language::from_tag(args) else {
        let known: Vec<_> = Language::ALL.iter().map(|l| l.tag()).collect();
        return CommandResult::Error(format!(
            "Unknown language {:?}. Available: {}",
            args,
            known.join(", ")
        ));
    };

    ctx.language = language;
    ctx.config.language = language.tag().to_string();
    if let Some(store) = &ctx.store {
        if let Err(e) = store.save(&ctx.config) {
            return CommandResult::Error(format!(
                "Language set to {} but saving the config failed: {}",
                language, e
            ));
        }
    }
    CommandResult::Message(
        format!("Cue language set to {}", language)
            .bright_green()
            .to_string(),
    )
}

/// Print help information
fn print_help() {
    println!("{}", "repcue help".bold());
    println!("{}", "===========".bold());
    println!();
    println!("{}", "Tempo:".green());
    println!(
        "  {}  - eccentric-bottom pause-concentric-top pause, in seconds",
        "3-1-1-0".cyan()
    );
    println!();
    println!("{}", "Set Commands:".green());
    println!(
        "  {} - Start a set, e.g. start 3-1-1-0 8 squat",
        "start <tempo> <reps> [exercise]".cyan()
    );
    println!("  {}                           - Pause the set", "pause".cyan());
    println!("  {}                          - Continue a paused set", "resume".cyan());
    println!("  {}                            - Jump to the next rep", "skip".cyan());
    println!("  {}                            - End the set", "stop".cyan());
    println!("  {}                          - Show rep, phase and time", "status".cyan());
    println!(
        "  {} - List the cues without starting",
        "preview <tempo> <reps> [exercise]".cyan()
    );
    println!();
    println!("{}", "Other Commands:".green());
    println!(
        "  {}                      - Show or set the cue language (en, es, pt, fr, de)",
        "lang [tag]".bright_green()
    );
    println!("  {}                            - Show this help", "help".bright_green());
    println!("  {}                            - Exit the REPL", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_registry;
    use crate::commands::tests::test_context;
    use crate::config::{ConfigStore, FileConfigStore};
    use tempfile::tempdir;

    #[test]
    fn test_lang_shows_and_switches() {
        let registry = create_registry();
        let (mut ctx, _player) = test_context();

        assert_eq!(
            registry.execute("lang", &mut ctx),
            CommandResult::Message("Cue language: en".to_string())
        );
        assert!(matches!(
            registry.execute("lang pt-BR", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.language, Language::Portuguese);
        assert!(matches!(
            registry.execute("lang klingon", &mut ctx),
            CommandResult::Error(_)
        ));
        assert_eq!(ctx.language, Language::Portuguese);
    }

    #[test]
    fn test_lang_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let registry = create_registry();
        let (ctx, _player) = test_context();
        let mut ctx = ctx.with_store(Box::new(FileConfigStore::with_path(&path)));

        registry.execute("lang de", &mut ctx);
        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.language, "de");
    }
}
