//! Tests for the config file strategy.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::model::SettingType;

fn home_with(files: &[(&str, &str)]) -> TempDir {
    let home = TempDir::new().unwrap();
    for (path, content) in files {
        let full = home.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    home
}

mod tilde {
    use super::*;

    #[test]
    fn expands_against_home() {
        let home = Path::new("/home/ada");

        assert_eq!(
            expand_tilde("~/.tmux.conf", Some(home)),
            Some(PathBuf::from("/home/ada/.tmux.conf"))
        );
        assert_eq!(
            expand_tilde("/etc/gitconfig", Some(home)),
            Some(PathBuf::from("/etc/gitconfig"))
        );
    }

    #[test]
    fn needs_a_home_for_the_prefix() {
        assert_eq!(expand_tilde("~/.gitconfig", None), None);
        assert_eq!(expand_tilde("relative", None), Some(PathBuf::from("relative")));
    }
}

mod reading {
    use super::*;

    #[tokio::test]
    async fn reads_kitty_conf() {
        let home = home_with(&[(
            ".config/kitty/kitty.conf",
            "# comment\nfont_size 11.5\nenable_audio_bell no\n",
        )]);
        let strategy = FileStrategy::with_home(home.path());

        let config = strategy.extract(&Context::new(), "kitty").await.unwrap();

        assert_eq!(config.config_path, "~/.config/kitty/kitty.conf");
        assert_eq!(config.source.method, "file");
        assert!(config.source.location.ends_with("kitty.conf"));
        assert_eq!(config.settings["font_size"].default_value, Some(json!(11.5)));
    }

    #[tokio::test]
    async fn missing_first_candidate_moves_on() {
        let home = home_with(&[(".config/git/config", "[user]\n\tname = Ada\n")]);
        let strategy = FileStrategy::with_home(home.path());

        let config = strategy.extract(&Context::new(), "git").await.unwrap();

        assert_eq!(config.config_path, "~/.config/git/config");
        assert_eq!(config.format, "ini");
        assert_eq!(config.settings["user.name"].default_value, Some(json!("Ada")));
    }

    #[tokio::test]
    async fn reads_toml_tables() {
        let home = home_with(&[(
            ".config/starship.toml",
            "add_newline = false\n\n[character]\nsuccess_symbol = \"ok\"\n",
        )]);
        let strategy = FileStrategy::with_home(home.path());

        let config = strategy.extract(&Context::new(), "starship").await.unwrap();

        assert_eq!(config.format, "toml");
        assert_eq!(config.settings["add_newline"].setting_type, SettingType::Boolean);
        assert!(config.settings.contains_key("character.success_symbol"));
    }

    #[tokio::test]
    async fn invalid_toml_falls_through_to_next_candidate() {
        let home = home_with(&[
            (".config/alacritty/alacritty.toml", "[window\nopacity = "),
            (".config/alacritty/alacritty.yml", "window:\n  opacity: 0.9\n"),
        ]);
        let strategy = FileStrategy::with_home(home.path());

        let config = strategy.extract(&Context::new(), "alacritty").await.unwrap();

        assert_eq!(config.format, "yaml");
        assert!(config.settings.contains_key("window.opacity"));
    }

    #[tokio::test]
    async fn invalid_toml_alone_is_a_parse_error() {
        let home = home_with(&[(".config/mise/config.toml", "[tools\n")]);
        let strategy = FileStrategy::with_home(home.path());

        let err = strategy.extract(&Context::new(), "mise").await.unwrap_err();

        assert!(matches!(err, StrategyError::Parse(_)));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn no_file_reports_the_last_path() {
        let home = home_with(&[]);
        let strategy = FileStrategy::with_home(home.path());

        let err = strategy.extract(&Context::new(), "tmux").await.unwrap_err();

        match err {
            StrategyError::Io { path, source } => {
                assert!(path.ends_with(".config/tmux/tmux.conf"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn comment_only_file_has_no_settings() {
        let home = home_with(&[(".config/ghostty/config", "# nothing here\n")]);
        let strategy = FileStrategy::with_home(home.path());

        let err = strategy.extract(&Context::new(), "ghostty").await.unwrap_err();

        assert!(matches!(err, StrategyError::NoSettings));
    }

    #[tokio::test]
    async fn cancelled_context_reads_nothing() {
        let home = home_with(&[(".tmux.conf", "set -g mouse on\n")]);
        let strategy = FileStrategy::with_home(home.path());
        let ctx = Context::new();
        ctx.cancel();

        let err = strategy.extract(&ctx, "tmux").await.unwrap_err();

        assert!(matches!(err, StrategyError::Interrupted(_)));
    }

    #[test]
    fn knows_its_apps() {
        let strategy = FileStrategy::with_home("/nonexistent");

        assert_eq!(strategy.priority(), 30);
        assert!(strategy.can_extract("mise"));
        assert!(!strategy.can_extract("neovim"));
        assert_eq!(strategy.known_apps().len(), 9);
    }
}
