//! The description of a command tree, along with decorators to hide, deprecate, or alias commands.
use std::any::Any;
use std::collections::BTreeMap;

use crate::model::Value;

mod error;

pub use error::{exit_control, CommandError};

/// The sub-commands of a command, by name.
pub type Subcommands = BTreeMap<String, Box<dyn Command>>;

/// Behaviour of a node in a command tree.
///
/// Decorators ([`Hidden`], [`Deprecated`], [`Alias`]) delegate every getter to the command they wrap,
/// and expose it via [`Command::wrapped`].
pub trait Command: Any {
    /// The one line summary.
    fn summary(&self) -> &str;

    /// The full description.
    fn description(&self) -> &str;

    /// The group name, for grouping related sub-commands (empty when ungrouped).
    fn group(&self) -> &str;

    /// The sub-commands.
    fn subcommands(&self) -> &Subcommands;

    /// The argument defaults, if any.
    fn defaults(&self) -> Option<&Value>;

    /// The decorated command, when this command is a decorator.
    fn wrapped(&self) -> Option<&dyn Command> {
        None
    }

    /// This command as `Any`, in order to detect decorators.
    fn as_any(&self) -> &dyn Any;
}

/// A plain [`Command`].
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::command::{Command, CommandSpec, Hidden};
///
/// let root = CommandSpec::new("A tool.")
///     .describe("A tool which does things.")
///     .subcommand("run", CommandSpec::new("Run a thing.").in_group("actions"))
///     .subcommand("debug", Hidden::new(CommandSpec::new("Debug a thing.")));
///
/// assert_eq!(root.summary(), "A tool.");
/// assert_eq!(
///     root.subcommands().keys().collect::<Vec<_>>(),
///     vec!["debug", "run"]
/// );
/// assert_eq!(root.subcommands()["run"].group(), "actions");
/// ```
#[derive(Debug, Default)]
pub struct CommandSpec {
    summary: String,
    description: String,
    group: String,
    subcommands: Subcommands,
    defaults: Option<Value>,
}

impl CommandSpec {
    /// Create a command with the one line `summary`.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Document the full description.
    /// If repeated, only the final description will apply.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Place this command in the group `group`.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Add the sub-command `name`.
    /// If repeated, only the final sub-command of the same name will apply.
    pub fn subcommand(mut self, name: impl Into<String>, command: impl Command) -> Self {
        self.subcommands.insert(name.into(), Box::new(command));
        self
    }

    /// Set the argument defaults.
    pub fn default_values(mut self, defaults: Value) -> Self {
        self.defaults.replace(defaults);
        self
    }
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("summary", &self.summary())
            .field("subcommands", &self.subcommands().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Command for CommandSpec {
    fn summary(&self) -> &str {
        &self.summary
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn subcommands(&self) -> &Subcommands {
        &self.subcommands
    }

    fn defaults(&self) -> Option<&Value> {
        self.defaults.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! delegate_command {
    ($decorator:ty) => {
        impl Command for $decorator {
            fn summary(&self) -> &str {
                self.wrapped.summary()
            }

            fn description(&self) -> &str {
                self.wrapped.description()
            }

            fn group(&self) -> &str {
                self.wrapped.group()
            }

            fn subcommands(&self) -> &Subcommands {
                self.wrapped.subcommands()
            }

            fn defaults(&self) -> Option<&Value> {
                self.wrapped.defaults()
            }

            fn wrapped(&self) -> Option<&dyn Command> {
                Some(self.wrapped.as_ref())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Hide the wrapped command from usage messages.
#[derive(Debug)]
pub struct Hidden {
    wrapped: Box<dyn Command>,
}

impl Hidden {
    /// Hide `command`.
    pub fn new(command: impl Command) -> Self {
        Self {
            wrapped: Box::new(command),
        }
    }
}

delegate_command!(Hidden);

/// Mark the wrapped command as deprecated.
#[derive(Debug)]
pub struct Deprecated {
    wrapped: Box<dyn Command>,
    alternative: String,
}

impl Deprecated {
    /// Deprecate `command` in favour of the `alternative` command (empty when there is none).
    pub fn new(command: impl Command, alternative: impl Into<String>) -> Self {
        Self {
            wrapped: Box::new(command),
            alternative: alternative.into(),
        }
    }

    /// The command to use instead.
    pub fn alternative(&self) -> &str {
        &self.alternative
    }
}

delegate_command!(Deprecated);

/// Expose the wrapped command under another name.
#[derive(Debug)]
pub struct Alias {
    wrapped: Box<dyn Command>,
}

impl Alias {
    /// Alias `command`.
    pub fn new(command: impl Command) -> Self {
        Self {
            wrapped: Box::new(command),
        }
    }
}

delegate_command!(Alias);

// The command along with each command it decorates, outermost first.
fn chain(command: &dyn Command) -> impl Iterator<Item = &dyn Command> {
    std::iter::successors(Some(command), |command| command.wrapped())
}

/// Whether the command is hidden (anywhere along its decorators).
pub fn is_hidden(command: &dyn Command) -> bool {
    chain(command).any(|command| command.as_any().is::<Hidden>())
}

/// Whether the command is an alias (anywhere along its decorators).
pub fn is_alias(command: &dyn Command) -> bool {
    chain(command).any(|command| command.as_any().is::<Alias>())
}

/// The alternative to the command, if it is deprecated (anywhere along its decorators).
pub fn deprecation(command: &dyn Command) -> Option<&str> {
    chain(command)
        .find_map(|command| command.as_any().downcast_ref::<Deprecated>())
        .map(Deprecated::alternative)
}

/// Find the command at `path`, following sub-commands from `root`.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::command::{find, Command, CommandSpec};
///
/// let root = CommandSpec::new("root")
///     .subcommand("db", CommandSpec::new("db").subcommand("migrate", CommandSpec::new("migrate")));
///
/// assert_eq!(find(&root, &["db", "migrate"]).unwrap().summary(), "migrate");
/// assert!(find(&root, &["db", "drop"]).is_none());
/// ```
pub fn find<'c>(root: &'c dyn Command, path: &[&str]) -> Option<&'c dyn Command> {
    path.iter().try_fold(root, |command, name| {
        command.subcommands().get(*name).map(|sub| sub.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf() -> CommandSpec {
        CommandSpec::new("summary")
            .describe("description")
            .in_group("group")
            .default_values(Value::new(7u32))
            .subcommand("child", CommandSpec::new("child summary"))
    }

    fn assert_delegates(command: &dyn Command) {
        assert_eq!(command.summary(), "summary");
        assert_eq!(command.description(), "description");
        assert_eq!(command.group(), "group");
        assert_eq!(
            command.subcommands().keys().collect::<Vec<_>>(),
            vec!["child"]
        );
        assert_eq!(
            command.defaults().and_then(|value| value.downcast_ref::<u32>()),
            Some(&7)
        );
    }

    #[test]
    fn command_spec() {
        // Setup
        let command = leaf();

        // Verify
        assert_delegates(&command);
        assert!(command.wrapped().is_none());
        assert!(!is_hidden(&command));
        assert!(!is_alias(&command));
        assert_eq!(deprecation(&command), None);
    }

    #[test]
    fn command_spec_empty() {
        let command = CommandSpec::new("summary");

        assert_eq!(command.description(), "");
        assert_eq!(command.group(), "");
        assert!(command.subcommands().is_empty());
        assert!(command.defaults().is_none());
    }

    #[test]
    fn hidden() {
        // Setup
        let command = Hidden::new(leaf());

        // Verify
        assert_delegates(&command);
        assert_delegates(command.wrapped().unwrap());
        assert!(is_hidden(&command));
        assert!(!is_alias(&command));
        assert_eq!(deprecation(&command), None);
    }

    #[test]
    fn deprecated() {
        // Setup
        let command = Deprecated::new(leaf(), "other");

        // Verify
        assert_delegates(&command);
        assert_eq!(command.alternative(), "other");
        assert!(!is_hidden(&command));
        assert_eq!(deprecation(&command), Some("other"));
    }

    #[test]
    fn alias() {
        // Setup
        let command = Alias::new(leaf());

        // Verify
        assert_delegates(&command);
        assert!(is_alias(&command));
        assert!(!is_hidden(&command));
        assert!(command.wrapped().unwrap().as_any().is::<CommandSpec>());
    }

    #[test]
    fn stacked() {
        // Setup
        let command = Alias::new(Hidden::new(Deprecated::new(leaf(), "")));

        // Verify
        assert_delegates(&command);
        assert!(is_alias(&command));
        assert!(is_hidden(&command));
        assert_eq!(deprecation(&command), Some(""));
        assert_eq!(chain(&command).count(), 4);
    }

    #[test]
    fn subcommand_replaced() {
        let command = CommandSpec::new("root")
            .subcommand("a", CommandSpec::new("first"))
            .subcommand("a", CommandSpec::new("second"));

        assert_eq!(command.subcommands().len(), 1);
        assert_eq!(command.subcommands()["a"].summary(), "second");
    }

    #[rstest]
    #[case(vec![], Some("root"))]
    #[case(vec!["a"], Some("a"))]
    #[case(vec!["a", "b"], Some("b"))]
    #[case(vec!["b"], None)]
    #[case(vec!["a", "b", "c"], None)]
    fn find_path(#[case] path: Vec<&str>, #[case] expected: Option<&str>) {
        // Setup
        let root = CommandSpec::new("root").subcommand(
            "a",
            Hidden::new(CommandSpec::new("a").subcommand("b", CommandSpec::new("b"))),
        );

        // Execute
        let found = find(&root, &path);

        // Verify
        assert_eq!(found.map(|command| command.summary()), expected);
    }

    #[test]
    fn debug() {
        let command: Box<dyn Command> = Box::new(leaf());

        assert_eq!(
            format!("{command:?}"),
            "Command { summary: \"summary\", subcommands: [\"child\"], .. }"
        );
    }
}
