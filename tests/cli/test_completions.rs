//! Tests for shell completion generation

use clap_complete::Shell;
use ragprep::cli::commands::completions::write_completions;

#[test]
fn test_completions_mention_subcommands() {
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let mut out = Vec::new();
        write_completions(shell, &mut out);
        let script = String::from_utf8(out).unwrap();

        assert!(script.contains("ragprep"), "{shell:?} script missing binary name");
        assert!(script.contains("ingest"), "{shell:?} script missing ingest");
        assert!(script.contains("show-config"), "{shell:?} script missing show-config");
    }
}
