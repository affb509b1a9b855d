use calendar_events::{
    Expression, Schedule, load_schedule_from_json, load_schedule_from_text, save_schedule_to_json,
    save_schedule_to_text,
};
use chrono::{DateTime, FixedOffset, Utc};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const DEFAULT_UPCOMING: usize = 5;

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  parse <expr...>                    Show the canonical form of an expression\n  next <expr...>                     Next occurrence of an expression after the reference time\n  at <rfc3339|now>                   Set the reference time (default: now)\n  add <expr...>                      Append an expression to the schedule\n  remove <index>                     Remove the expression at index\n  show                               List the schedule\n  upcoming [n]                       Next n occurrences of the schedule (default 5)\n  save <json|text> <path>            Persist the schedule to disk\n  load <json|text> <path>            Load a schedule from disk\n  quit|exit                          Exit"
    );
}

fn print_schedule(schedule: &Schedule) {
    if schedule.is_empty() {
        println!("Schedule is empty.");
        return;
    }
    for (index, expression) in schedule.iter().enumerate() {
        println!("  [{index}] {expression}");
    }
}

fn parse_reference(input: &str) -> Option<DateTime<FixedOffset>> {
    if input == "now" {
        return Some(Utc::now().fixed_offset());
    }
    DateTime::parse_from_rfc3339(input).ok()
}

fn rest_of_line<'a>(input: &'a str, cmd: &str) -> &'a str {
    input[cmd.len()..].trim()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let mut schedule = Schedule::default();
    let mut reference = Utc::now().fixed_offset();

    println!("Calendar Events (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "parse" => match Expression::parse(rest_of_line(input, cmd)) {
                Ok(expression) => println!("{expression}"),
                Err(e) => println!("Error: {e}"),
            },
            "next" => match Expression::parse(rest_of_line(input, cmd)) {
                Ok(expression) => match expression.next(&reference) {
                    Some(next) => println!("{}", next.to_rfc3339()),
                    None => println!("No next occurrence."),
                },
                Err(e) => println!("Error: {e}"),
            },
            "at" => match parts.next().and_then(parse_reference) {
                Some(at) => {
                    reference = at;
                    println!("Reference time set to {}.", reference.to_rfc3339());
                }
                None => println!("Usage: at <rfc3339|now>"),
            },
            "add" => match Expression::parse(rest_of_line(input, cmd)) {
                Ok(expression) => {
                    println!("Added [{}] {}", schedule.len(), expression);
                    schedule.push(expression);
                }
                Err(e) => println!("Error: {e}"),
            },
            "remove" => {
                let index = match parts.next().map(str::parse::<usize>) {
                    Some(Ok(index)) => index,
                    _ => {
                        println!("Usage: remove <index>");
                        continue;
                    }
                };
                match schedule.remove(index) {
                    Some(expression) => println!("Removed [{index}] {expression}"),
                    None => println!("No expression at index {index}."),
                }
            }
            "show" => print_schedule(&schedule),
            "upcoming" => {
                let count = match parts.next().map(str::parse::<usize>) {
                    None => DEFAULT_UPCOMING,
                    Some(Ok(count)) => count,
                    Some(Err(_)) => {
                        println!("Usage: upcoming [n]");
                        continue;
                    }
                };
                let mut printed = 0;
                for occurrence in schedule.occurrences(&reference).take(count) {
                    println!("{}", occurrence.to_rfc3339());
                    printed += 1;
                }
                if printed == 0 {
                    println!("No upcoming occurrence.");
                }
            }
            "save" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        "json" => save_schedule_to_json(&schedule, path),
                        "text" => save_schedule_to_text(&schedule, path),
                        _ => {
                            println!("Unknown format '{format}' (expected json or text)");
                            continue;
                        }
                    };
                    match result {
                        Ok(()) => println!("Schedule saved to {path}."),
                        Err(e) => println!("Save error: {e}"),
                    }
                }
                _ => println!("Usage: save <json|text> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        "json" => load_schedule_from_json(path),
                        "text" => load_schedule_from_text(path),
                        _ => {
                            println!("Unknown format '{format}' (expected json or text)");
                            continue;
                        }
                    };
                    match result {
                        Ok(loaded) => {
                            schedule = loaded;
                            println!("Schedule loaded from {path}.");
                            print_schedule(&schedule);
                        }
                        Err(e) => println!("Load error: {e}"),
                    }
                }
                _ => println!("Usage: load <json|text> <path>"),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
}
