use nelson::command::{exit_control, find, is_hidden, Command, CommandError, CommandSpec, Hidden};
use nelson::derive::*;
use nelson::interval::Interval;
use nelson::{capability, Injector, TypeKey, Value};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}

capability!(Greeter = [English]);

#[derive(Default)]
struct Greet {
    greeted: usize,
}

#[receiver]
impl Greet {
    fn run(&mut self, greeter: Arc<dyn Greeter>, repeat: Interval) -> Result<(), CommandError> {
        if repeat.start < 0 || repeat.end > 10 {
            return Err(CommandError::new(format!("cannot greet {repeat} times"), 2).with_usage());
        }

        for i in repeat.start..repeat.end {
            println!("{}: {}", i, greeter.greet("world"));
            self.greeted += 1;
        }

        Ok(())
    }

    #[receiver(skip)]
    fn greeted(&self) -> usize {
        self.greeted
    }
}

fn main() {
    let root = CommandSpec::new("A greeter.")
        .subcommand("greet", CommandSpec::new("Greet the world."))
        .subcommand("debug", Hidden::new(CommandSpec::new("Debug the greeter.")));

    for (name, command) in root.subcommands() {
        if !is_hidden(&**command) {
            println!("{name}: {}", command.summary());
        }
    }

    let repeat = std::env::args().nth(1).unwrap_or_else(|| "[0,3)".to_string());
    let mut injector = Injector::new();
    injector
        .vivify_with(TypeKey::interface::<dyn Greeter>(), |_, _| Ok(Value::new(English)))
        .unwrap();

    match repeat.parse::<Interval>() {
        Ok(interval) => injector.provide(interval).unwrap(),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(2);
        }
    }

    let mut greet = Greet::default();
    let summary = find(&root, &["greet"]).map(|command| command.summary());
    println!("{}", summary.unwrap_or_default());

    if let Err(error) = injector.call(Some(&mut greet), "run") {
        let (code, usage) = exit_control(&error);
        eprintln!("{error}");

        if usage {
            eprintln!("usage: greeter [INTERVAL]");
        }

        std::process::exit(code);
    }

    println!("Greeted {} times.", greet.greeted());
}
