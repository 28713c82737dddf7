//! Command dispatch
//!
//! [`CommandInterpreter::execute`] is pure: it reads the session through a
//! [`CommandContext`] and returns a [`CommandResult`]. Expected failures are
//! error lines, never Rust errors.

use termsite_vfs::path::PREVIOUS_ALIAS;
use termsite_vfs::{
    is_syntactically_valid, is_valid_name, FileSystemNode, NodeKind, PathResolver,
    VirtualFileSystem,
};

use crate::command::{parse_line, CommandName};
use crate::effect::{CommandResult, Effect};

/// Suffix of the per-visitor comment file
pub const COMMENT_FILE_SUFFIX: &str = ".comment";

/// Read-only view of the session handed to handlers
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Session filesystem
    pub fs: &'a VirtualFileSystem,
    /// Resolver bound to the visitor's home
    pub resolver: &'a PathResolver,
    /// Current directory (absolute)
    pub cwd: &'a str,
    /// Visitor nickname
    pub nickname: &'a str,
    /// Directory before the last successful `cd`
    pub previous_dir: Option<&'a str>,
}

/// Name of the comment file for a nickname
#[inline]
#[must_use]
pub fn comment_file_name(nickname: &str) -> String {
    format!("{nickname}{COMMENT_FILE_SUFFIX}")
}

/// Stateless command dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInterpreter;

impl CommandInterpreter {
    /// Create interpreter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Interpret one raw line
    ///
    /// Blank lines give an empty result with no effect.
    #[must_use]
    pub fn execute(&self, raw: &str, ctx: &CommandContext<'_>) -> CommandResult {
        let Some(line) = parse_line(raw) else {
            return CommandResult::empty();
        };
        let Ok(command) = line.name.parse::<CommandName>() else {
            return CommandResult::error(format!("command not found: {}", line.name));
        };
        let args = line.args.as_slice();

        match command {
            CommandName::Cd => cd(args, ctx),
            CommandName::Ls => ls(args, ctx),
            CommandName::Mkdir => mkdir(args, ctx),
            CommandName::Pwd => CommandResult::line(ctx.cwd),
            CommandName::Whoami => CommandResult::line(ctx.nickname),
            CommandName::Open => open(args, ctx),
            CommandName::Comment => comment(args, ctx),
            CommandName::Clear => CommandResult::empty().with_effect(Effect::ClearLog),
            CommandName::Help => help(),
        }
    }
}

fn cd(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let target = args.first().copied().unwrap_or_default();
    let path = match (target, ctx.previous_dir) {
        (PREVIOUS_ALIAS, Some(previous)) => previous.to_string(),
        _ => ctx.resolver.resolve(ctx.cwd, target),
    };

    if !is_syntactically_valid(&path) {
        return CommandResult::error(format!("cd: invalid path: {target}"));
    }
    match ctx.fs.node_at(&path).map(FileSystemNode::kind) {
        None => CommandResult::error(format!("cd: no such file or directory: {target}")),
        Some(NodeKind::File) => CommandResult::error(format!("cd: not a directory: {target}")),
        Some(NodeKind::Directory) => CommandResult::empty().with_effect(Effect::ChangeDirectory(path)),
    }
}

fn ls(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let target = args.first().copied().unwrap_or(".");
    let path = ctx.resolver.resolve(ctx.cwd, target);

    if !is_syntactically_valid(&path) {
        return CommandResult::error(format!("ls: invalid path: {target}"));
    }
    let Some(node) = ctx.fs.node_at(&path) else {
        return CommandResult::error(format!(
            "ls: cannot access '{target}': No such file or directory"
        ));
    };
    if !node.is_directory() {
        return CommandResult::line(node.name());
    }

    let mut entries: Vec<&FileSystemNode> = node.children().iter().collect();
    entries.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name().cmp(b.name()))
    });
    CommandResult::output(entries.into_iter().map(FileSystemNode::name))
}

fn mkdir(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(&name) = args.first() else {
        return CommandResult::error("mkdir: missing operand");
    };
    if !is_valid_name(name) {
        return CommandResult::error(format!(
            "mkdir: cannot create directory '{name}': Invalid name"
        ));
    }
    let exists = ctx
        .fs
        .node_at(ctx.cwd)
        .is_some_and(|dir| dir.child(name).is_some());
    if exists {
        return CommandResult::error(format!("mkdir: cannot create directory '{name}': File exists"));
    }

    CommandResult::empty().with_effect(Effect::CreateDirectory {
        parent: ctx.cwd.to_string(),
        name: name.to_string(),
    })
}

fn open(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(&name) = args.first() else {
        return CommandResult::error("open: missing filename");
    };
    let path = ctx.resolver.resolve(ctx.cwd, name);
    let content = if is_syntactically_valid(&path) {
        ctx.fs.read_file_content(&path)
    } else {
        None
    };

    match content {
        Some(content) => CommandResult::line(content),
        None => CommandResult::error(format!("open: {name}: No such file")),
    }
}

fn comment(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let text = args.join(" ");
    if text.is_empty() {
        return CommandResult::error("comment: missing text");
    }
    let file_name = comment_file_name(ctx.nickname);
    let blocked = ctx
        .fs
        .node_at(ctx.cwd)
        .and_then(|dir| dir.child(&file_name))
        .is_some_and(FileSystemNode::is_directory);
    if blocked {
        return CommandResult::error(format!(
            "comment: cannot write '{file_name}': Is a directory"
        ));
    }

    CommandResult::line(format!("comment saved to {file_name}")).with_effect(Effect::WriteComment {
        parent: ctx.cwd.to_string(),
        file_name,
        content: text,
    })
}

fn help() -> CommandResult {
    let width = CommandName::all()
        .iter()
        .map(|cmd| cmd.usage().len())
        .max()
        .unwrap_or_default();
    let mut lines = vec!["Available commands:".to_string()];
    lines.extend(
        CommandName::all()
            .iter()
            .map(|cmd| format!("  {:<width$}  {}", cmd.usage(), cmd.description())),
    );
    CommandResult::output(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use termsite_vfs::build_tree;

    struct Fixture {
        fs: VirtualFileSystem,
        resolver: PathResolver,
    }

    impl Fixture {
        fn new() -> Self {
            let mut fs = build_tree("alice", &[]).unwrap();
            fs.create_directory("/home/alice", "empty").unwrap();
            Self {
                fs,
                resolver: PathResolver::for_nickname("alice"),
            }
        }

        fn run(&self, cwd: &str, line: &str) -> CommandResult {
            let ctx = CommandContext {
                fs: &self.fs,
                resolver: &self.resolver,
                cwd,
                nickname: "alice",
                previous_dir: None,
            };
            CommandInterpreter::new().execute(line, &ctx)
        }
    }

    #[test]
    fn unknown_command() {
        let result = Fixture::new().run("/", "frobnicate now");
        assert_eq!(result.error.as_deref(), Some("command not found: frobnicate"));
    }

    #[test]
    fn blank_line_is_noop() {
        assert_eq!(Fixture::new().run("/", "   "), CommandResult::empty());
    }

    #[test]
    fn cd_reports_effect_without_output() {
        let result = Fixture::new().run("/home/alice", "cd projects");
        assert!(result.output_lines.is_empty());
        assert_eq!(
            result.effect,
            Effect::ChangeDirectory("/home/alice/projects".into())
        );
    }

    #[test]
    fn cd_errors() {
        let fx = Fixture::new();
        assert_eq!(
            fx.run("/home/alice", "cd nonexistent").error.as_deref(),
            Some("cd: no such file or directory: nonexistent")
        );
        assert_eq!(
            fx.run("/home/alice", "cd about.txt").error.as_deref(),
            Some("cd: not a directory: about.txt")
        );
        assert_eq!(
            fx.run("/home/alice", "cd ../bob").error.as_deref(),
            Some("cd: invalid path: ../bob")
        );
        assert_eq!(fx.run("/home/alice", "cd ../bob").effect, Effect::None);
    }

    #[test]
    fn cd_dash_without_previous_goes_home() {
        let result = Fixture::new().run("/", "cd -");
        assert_eq!(result.effect, Effect::ChangeDirectory("/home/alice".into()));
    }

    #[test]
    fn cd_dash_uses_previous_directory() {
        let fx = Fixture::new();
        let ctx = CommandContext {
            fs: &fx.fs,
            resolver: &fx.resolver,
            cwd: "/home/alice",
            nickname: "alice",
            previous_dir: Some("/home"),
        };
        let result = CommandInterpreter::new().execute("cd -", &ctx);
        assert_eq!(result.effect, Effect::ChangeDirectory("/home".into()));
    }

    #[test]
    fn ls_sorts_directories_first() {
        let result = Fixture::new().run("/home/alice", "ls");
        assert_eq!(
            result.output_lines,
            vec!["empty", "projects", "about.txt", "contact.txt"]
        );
    }

    #[test]
    fn ls_variants() {
        let fx = Fixture::new();
        assert!(fx.run("/home/alice", "ls empty").output_lines.is_empty());
        assert_eq!(fx.run("/home/alice", "ls about.txt").output_lines, vec!["about.txt"]);
        assert_eq!(fx.run("/", "ls /home").output_lines, vec!["alice"]);
        assert_eq!(
            fx.run("/", "ls nope").error.as_deref(),
            Some("ls: cannot access 'nope': No such file or directory")
        );
        assert_eq!(
            fx.run("/", "ls /a//b").error.as_deref(),
            Some("ls: invalid path: /a//b")
        );
    }

    #[test]
    fn mkdir_validation() {
        let fx = Fixture::new();
        assert_eq!(
            fx.run("/home/alice", "mkdir").error.as_deref(),
            Some("mkdir: missing operand")
        );
        assert_eq!(
            fx.run("/home/alice", "mkdir a/b").error.as_deref(),
            Some("mkdir: cannot create directory 'a/b': Invalid name")
        );
        assert_eq!(
            fx.run("/home/alice", "mkdir projects").error.as_deref(),
            Some("mkdir: cannot create directory 'projects': File exists")
        );
        assert_eq!(
            fx.run("/home/alice", "mkdir notes").effect,
            Effect::CreateDirectory {
                parent: "/home/alice".into(),
                name: "notes".into()
            }
        );
    }

    #[test]
    fn pwd_and_whoami() {
        let fx = Fixture::new();
        assert_eq!(fx.run("/home", "pwd").output_lines, vec!["/home"]);
        assert_eq!(fx.run("/home", "whoami").output_lines, vec!["alice"]);
    }

    #[test]
    fn open_reads_files() {
        let fx = Fixture::new();
        let result = fx.run("/home/alice", "open projects/README.txt");
        assert_eq!(result.output_lines.len(), 1);
        assert!(fx.run("/", "open /home/alice/about.txt").error.is_none());
        assert_eq!(
            fx.run("/home/alice", "open missingfile.txt").error.as_deref(),
            Some("open: missingfile.txt: No such file")
        );
        assert_eq!(
            fx.run("/home/alice", "open projects").error.as_deref(),
            Some("open: projects: No such file")
        );
        assert_eq!(
            fx.run("/home/alice", "open").error.as_deref(),
            Some("open: missing filename")
        );
    }

    #[test]
    fn comment_joins_arguments() {
        let result = Fixture::new().run("/home/alice", "comment hello   world");
        assert_eq!(result.output_lines, vec!["comment saved to alice.comment"]);
        assert_eq!(
            result.effect,
            Effect::WriteComment {
                parent: "/home/alice".into(),
                file_name: "alice.comment".into(),
                content: "hello world".into(),
            }
        );
        assert_eq!(
            Fixture::new().run("/", "comment").error.as_deref(),
            Some("comment: missing text")
        );
    }

    #[test]
    fn clear_and_help() {
        let fx = Fixture::new();
        let clear = fx.run("/", "clear");
        assert!(clear.output_lines.is_empty());
        assert_eq!(clear.effect, Effect::ClearLog);

        let help = fx.run("/", "help");
        assert_eq!(help.output_lines.len(), CommandName::all().len() + 1);
        assert!(help.output_lines.iter().any(|l| l.contains("mkdir <name>")));
    }
}
