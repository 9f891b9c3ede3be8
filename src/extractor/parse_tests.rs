//! Tests for the output and documentation parsers.

use super::*;
use serde_json::json;

mod helpers {
    use super::*;

    #[test]
    fn is_numeric_accepts_signed_decimals_only() {
        assert!(is_numeric("0"));
        assert!(is_numeric("-12"));
        assert!(is_numeric("0.95"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("-"));
        assert!(!is_numeric("."));
        assert!(!is_numeric("1.2.3"));
        assert!(!is_numeric("1-2"));
        assert!(!is_numeric("12px"));
    }

    #[test]
    fn infer_type_follows_value_shape() {
        assert_eq!(infer_type("true"), SettingType::Boolean);
        assert_eq!(infer_type(" 14 "), SettingType::Number);
        assert_eq!(infer_type("[1, 2]"), SettingType::Array);
        assert_eq!(infer_type("{a = 1}"), SettingType::Array);
        assert_eq!(infer_type("JetBrains Mono"), SettingType::String);
    }

    #[test]
    fn infer_category_uses_first_matching_keyword() {
        assert_eq!(infer_category("font-size"), "font");
        assert_eq!(infer_category("ui_font_family"), "font");
        assert_eq!(infer_category("background-color"), "appearance");
        assert_eq!(infer_category("Theme"), "appearance");
        assert_eq!(infer_category("window-padding-x"), "window");
        assert_eq!(infer_category("keybind"), "keybindings");
        assert_eq!(infer_category("cursor-style"), "editor");
        assert_eq!(infer_category("scrollback-limit"), "scrolling");
        assert_eq!(infer_category("shell-integration"), "terminal");
        assert_eq!(infer_category("confirm-close-surface"), "general");
    }

    #[test]
    fn parse_value_produces_typed_defaults() {
        assert_eq!(parse_value("true"), Some(json!(true)));
        assert_eq!(parse_value("2000"), Some(json!(2000)));
        assert_eq!(parse_value("0.5"), Some(json!(0.5)));
        assert_eq!(parse_value("\"dark\""), Some(json!("dark")));
        assert_eq!(parse_value("'C-b'"), Some(json!("C-b")));
        assert_eq!(parse_value("  "), None);
    }

    #[test]
    fn strip_formatting_removes_overstrike_and_ansi() {
        let bold = "m\u{8}mo\u{8}ou\u{8}us\u{8}se\u{8}e";
        let underlined = "_\u{8}l_\u{8}i_\u{8}n_\u{8}e_\u{8}s";
        let colored = "\u{1b}[1mstatus\u{1b}[0m";

        assert_eq!(strip_formatting(bold), "mouse");
        assert_eq!(strip_formatting(underlined), "lines");
        assert_eq!(strip_formatting(colored), "status");
    }
}

mod command_output {
    use super::*;

    #[test]
    fn ghostty_attaches_preceding_docs_and_marks_repeatable_keys() {
        let output = "\
# The font families to use.
# Can be repeated.
font-family =
font-family = Symbols Nerd Font

# Font size in points.
font-size = 13

cursor-style-blink = true
";
        let settings = ghostty(output);

        let family = &settings["font-family"];
        assert_eq!(family.setting_type, SettingType::Array);
        assert_eq!(family.description, "The font families to use. Can be repeated.");
        assert_eq!(family.default_value, None);

        let size = &settings["font-size"];
        assert_eq!(size.setting_type, SettingType::Number);
        assert_eq!(size.default_value, Some(json!(13)));
        assert_eq!(size.description, "Font size in points.");
        assert_eq!(size.category, "font");

        assert_eq!(settings["cursor-style-blink"].setting_type, SettingType::Boolean);
        assert_eq!(settings.len(), 3);
    }

    #[test]
    fn jsonc_flattens_nested_objects_and_reads_comments() {
        let content = r#"{
  // The name of the base keymap.
  "base_keymap": "VSCode",
  "buffer_font_size": 15, // points
  "vim_mode": false,
  "terminal": {
    // Terminal font size.
    "font_size": null,
    "env": {},
    "shell": "system"
  },
  "file_scan_exclusions": [
    "**/.git",
    "**/.svn"
  ],
  "languages": { "Rust": {
      "tab_size": 4
  } },
  "$schema": "ignored",
  "tab_size": 4
}"#;
        let settings = jsonc(content);

        let keymap = &settings["base_keymap"];
        assert_eq!(keymap.setting_type, SettingType::String);
        assert_eq!(keymap.default_value, Some(json!("VSCode")));
        assert_eq!(keymap.description, "The name of the base keymap.");

        assert_eq!(settings["buffer_font_size"].default_value, Some(json!(15)));
        assert_eq!(settings["vim_mode"].setting_type, SettingType::Boolean);
        assert_eq!(settings["terminal.font_size"].description, "Terminal font size.");
        assert_eq!(settings["terminal.font_size"].default_value, None);
        assert_eq!(settings["terminal.env"].setting_type, SettingType::Object);
        assert_eq!(settings["terminal.shell"].default_value, Some(json!("system")));
        assert_eq!(settings["file_scan_exclusions"].setting_type, SettingType::Array);
        assert_eq!(settings["languages"].setting_type, SettingType::Object);
        assert_eq!(settings["tab_size"].default_value, Some(json!(4)));
        assert!(!settings.contains_key("$schema"));
        assert!(!settings.contains_key("languages.Rust.tab_size"));
        assert!(!settings.contains_key("**/.git"));
    }

    #[test]
    fn lua_reads_config_assignments() {
        let content = r#"
local config = wezterm.config_builder()
config.font_size = 12.0
config.color_scheme = "Batman" -- dark
config.enable_tab_bar = false
config.keys = {
config.font = wezterm.font("JetBrains Mono")
"#;
        let settings = lua(content);

        assert_eq!(settings["font_size"].default_value, Some(json!(12.0)));
        assert_eq!(settings["color_scheme"].default_value, Some(json!("Batman")));
        assert_eq!(settings["color_scheme"].category, "appearance");
        assert_eq!(settings["enable_tab_bar"].setting_type, SettingType::Boolean);
        assert_eq!(settings["keys"].setting_type, SettingType::Array);
        assert_eq!(settings["font"].setting_type, SettingType::String);
        assert_eq!(settings["font"].default_value, None);
    }

    #[test]
    fn tmux_options_maps_on_off_to_booleans() {
        let output = "history-limit 2000\nmouse off\nprefix C-b\nstatus-left \"[#S] \"\n";
        let settings = tmux_options(output);

        assert_eq!(settings["history-limit"].default_value, Some(json!(2000)));
        assert_eq!(settings["mouse"].setting_type, SettingType::Boolean);
        assert_eq!(settings["mouse"].default_value, Some(json!(false)));
        assert_eq!(settings["prefix"].default_value, Some(json!("C-b")));
        assert_eq!(settings["status-left"].default_value, Some(json!("[#S] ")));
    }

    #[test]
    fn git_list_strips_origin_and_keeps_last_value() {
        let output = "\
file:/home/u/.gitconfig\tuser.name=Ada
file:/home/u/.gitconfig\tcore.editor=vim
file:.git/config\tcore.editor=nvim
command line:\tcore.bare
";
        let settings = git_list(output);

        assert_eq!(settings["user.name"].default_value, Some(json!("Ada")));
        assert_eq!(settings["core.editor"].default_value, Some(json!("nvim")));
        assert_eq!(settings["core.bare"].setting_type, SettingType::Boolean);
        assert_eq!(settings.len(), 3);
    }
}

mod config_files {
    use super::*;

    #[test]
    fn whitespace_pairs_reads_kitty_style_files() {
        let content = "# kitty\nfont_size 12.0\nmap ctrl+c copy\nmap ctrl+v paste\ncursor_blink_interval -1\n";
        let settings = whitespace_pairs(content);

        assert_eq!(settings["font_size"].default_value, Some(json!(12.0)));
        assert_eq!(settings["map"].setting_type, SettingType::Array);
        assert_eq!(settings["cursor_blink_interval"].default_value, Some(json!(-1)));
    }

    #[test]
    fn tmux_conf_reads_set_commands() {
        let content = "\
set -g mouse on
set-option -sg escape-time 10  # snappier
setw -g mode-keys vi
bind r source-file ~/.tmux.conf
set -g @plugin 'tmux-plugins/tpm'
set -g @plugin 'tmux-plugins/tmux-sensible'
";
        let settings = tmux_conf(content);

        assert_eq!(settings["mouse"].default_value, Some(json!(true)));
        assert_eq!(settings["escape-time"].default_value, Some(json!(10)));
        assert_eq!(settings["mode-keys"].default_value, Some(json!("vi")));
        assert_eq!(settings["@plugin"].setting_type, SettingType::Array);
        assert!(!settings.contains_key("r"));
    }

    #[test]
    fn gitconfig_joins_sections_and_subsections() {
        let content = r#"
[user]
    name = Ada Lovelace
    email = ada@example.com
; comment
[remote "origin"]
    url = git@example.com:repo.git
[core]
    autocrlf = false
    bare
"#;
        let settings = gitconfig(content);

        assert_eq!(settings["user.name"].default_value, Some(json!("Ada Lovelace")));
        assert_eq!(
            settings["remote.origin.url"].default_value,
            Some(json!("git@example.com:repo.git"))
        );
        assert_eq!(settings["core.autocrlf"].setting_type, SettingType::Boolean);
        assert_eq!(settings["core.bare"].default_value, Some(json!(true)));
    }

    #[test]
    fn yaml_sections_tracks_nesting_by_indentation() {
        let content = "\
window:
  padding:
    x: 2
    y: 2
  opacity: 0.9 # translucent
font:
  normal:
    family: \"Fira Code\"
  size: 11.0
shell:
  program: /bin/zsh
  args:
    - --login
notes: |
  a: not a key
  b: neither
live_config_reload: true
";
        let settings = yaml_sections(content);

        assert_eq!(settings["window.padding.x"].default_value, Some(json!(2)));
        assert_eq!(settings["window.opacity"].default_value, Some(json!(0.9)));
        assert_eq!(settings["font.normal.family"].default_value, Some(json!("Fira Code")));
        assert_eq!(settings["font.size"].setting_type, SettingType::Number);
        assert_eq!(settings["shell.program"].default_value, Some(json!("/bin/zsh")));
        assert_eq!(settings["notes"].setting_type, SettingType::String);
        assert_eq!(settings["live_config_reload"].setting_type, SettingType::Boolean);
        assert!(!settings.contains_key("notes.a"));
        assert!(!settings.contains_key("a"));
    }

    #[test]
    fn toml_document_flattens_tables() {
        let content = r#"
add_newline = false
format = "$all"

[character]
success_symbol = "[➜](bold green)"

[font.normal]
family = "Iosevka"

[tools]
node = ["20", "lts"]
"#;
        let settings = toml_document(content).unwrap();

        assert_eq!(settings["add_newline"].default_value, Some(json!(false)));
        assert_eq!(settings["character.success_symbol"].setting_type, SettingType::String);
        assert_eq!(settings["font.normal.family"].category, "font");
        assert_eq!(settings["tools.node"].setting_type, SettingType::Array);
        assert_eq!(settings["tools.node"].default_value, Some(json!(["20", "lts"])));
    }

    #[test]
    fn toml_document_reports_syntax_errors() {
        assert!(toml_document("key = = 1").is_err());
    }
}

mod documentation {
    use super::*;

    #[test]
    fn markdown_collects_config_references_and_identifier_headings() {
        let content = "\
# Configuration Reference

## font_size

Sets the font size in points.
Fractional values are allowed.

## Overview

```lua
config.color_scheme = 'Batman'
local x = 1
```

Chooses the color scheme.
";
        let settings = markdown(content);

        let size = &settings["font_size"];
        assert_eq!(size.description, "Sets the font size in points. Fractional values are allowed.");
        assert_eq!(size.category, "font");
        assert!(settings.contains_key("color_scheme"));
        assert_eq!(settings["color_scheme"].description, "Chooses the color scheme.");
        assert!(!settings.contains_key("Overview"));
        assert!(!settings.contains_key("Configuration"));
    }

    #[test]
    fn c_option_table_reads_tmux_entries() {
        let content = r#"
const struct options_table_entry options_table[] = {
	{ .name = "buffer-limit",
	  .type = OPTIONS_TABLE_NUMBER,
	  .scope = OPTIONS_TABLE_SERVER,
	  .minimum = 1,
	  .maximum = INT_MAX,
	  .default_num = 50,
	  .text = "The maximum number of automatic buffers."
	},

	{ .name = "focus-events",
	  .type = OPTIONS_TABLE_FLAG,
	  .scope = OPTIONS_TABLE_SERVER,
	  .default_num = 0,
	},

	{ .name = "default-shell",
	  .type = OPTIONS_TABLE_STRING,
	  .default_str = _PATH_BSHELL,
	},

	{ .name = "status-left",
	  .type = OPTIONS_TABLE_STRING,
	  .default_str = "[#{session_name}] ",
	  .text = "Contents of the left side of the \"status line\"."
	},
};
"#;
        let settings = c_option_table(content);

        let limit = &settings["buffer-limit"];
        assert_eq!(limit.setting_type, SettingType::Number);
        assert_eq!(limit.default_value, Some(json!(50)));
        assert_eq!(limit.description, "The maximum number of automatic buffers.");

        assert_eq!(settings["focus-events"].setting_type, SettingType::Boolean);
        assert_eq!(settings["focus-events"].default_value, Some(json!(false)));
        assert_eq!(settings["default-shell"].default_value, None);
        assert_eq!(settings["default-shell"].category, "terminal");
        assert_eq!(settings["status-left"].default_value, Some(json!("[#{session_name}] ")));
        assert_eq!(
            settings["status-left"].description,
            "Contents of the left side of the \"status line\"."
        );
    }

    #[test]
    fn vimdoc_reads_option_headers() {
        let content = "\
\t\t\t\t\t\t*'autoindent'* *'ai'*
'autoindent' 'ai'\tboolean\t(default on)
\t\t\tlocal to buffer
\tCopy indent from current line when starting a new line.
\tAlso applies to \"o\".

\t\t\t\t\t\t*'tabstop'* *'ts'*
'tabstop' 'ts'\t\tnumber\t(default 8)
\t\t\tlocal to buffer
\tNumber of spaces that a <Tab> in the file counts for.

'fileformat' 'ff'\tstring (default: \"unix\")
\t\t\tlocal to buffer
\tThis gives the <EOL> of the current buffer.

'cpoptions' 'cpo'\tstring\t(Vim default: \"aABceFs\",
";
        let settings = vimdoc(content);

        let ai = &settings["autoindent"];
        assert_eq!(ai.setting_type, SettingType::Boolean);
        assert_eq!(ai.default_value, Some(json!(true)));
        assert_eq!(
            ai.description,
            "Copy indent from current line when starting a new line. Also applies to \"o\"."
        );
        assert_eq!(settings["tabstop"].default_value, Some(json!(8)));
        assert_eq!(settings["fileformat"].default_value, Some(json!("unix")));
        assert!(settings.contains_key("cpoptions"));
    }

    #[test]
    fn mdoc_reads_options_section_only() {
        let content = "\
.Sh COMMANDS
.It Ic attach-session
Attach to a session.
.Sh OPTIONS
.It Ic history-limit Ar lines
Set the maximum number of lines held in window history.
.It Xo Ic mouse
.Op Ic on | off
.Xc
If on, tmux captures the mouse.
.It Xo Ic status
.Op Ic off | on | 2 | 3
.Xc
Show or hide the status line.
.Sh ENVIRONMENT
.It Ic TMUX
";
        let settings = mdoc(content);

        assert!(!settings.contains_key("attach-session"));
        assert!(!settings.contains_key("TMUX"));
        assert_eq!(settings["history-limit"].setting_type, SettingType::Number);
        assert_eq!(
            settings["history-limit"].description,
            "Set the maximum number of lines held in window history."
        );
        assert_eq!(settings["mouse"].setting_type, SettingType::Boolean);
        assert_eq!(settings["mouse"].description, "If on, tmux captures the mouse.");
        assert_eq!(settings["status"].valid_values, ["off", "on", "2", "3"]);
    }

    #[test]
    fn man_page_reads_indented_option_entries() {
        let content = "\
OPTIONS
     The following options are available for every session and window.

     history-limit lines
             Set the maximum number of lines held in window history.
             This setting applies only to new windows.

     m\u{8}mo\u{8}ou\u{8}us\u{8}se\u{8}e [on | off]
             If on, tmux captures the mouse.

     status [off | on | 2]
             Show or hide the status line.

       core.editor
           Commands such as commit and tag that let you edit messages.

     Compression
             Specifies whether to use compression.
";
        let settings = man_page(content);

        let limit = &settings["history-limit"];
        assert_eq!(limit.setting_type, SettingType::Number);
        assert_eq!(
            limit.description,
            "Set the maximum number of lines held in window history. This setting applies only to new windows."
        );
        assert_eq!(settings["mouse"].setting_type, SettingType::Boolean);
        assert_eq!(settings["status"].valid_values, ["off", "on", "2"]);
        assert!(settings["core.editor"].description.starts_with("Commands such as commit"));
        assert!(settings.contains_key("Compression"));
        assert!(!settings.contains_key("The"));
    }
}
