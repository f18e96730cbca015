//! Acquisition Engine Host Shell
//!
//! This binary runs on your PC and provides an interactive shell around
//! the acquisition engine, wired to the simulated adapters: a ramp analog
//! source, an in-memory config store, and recording sinks. It walks the
//! full boot → configure → sample → drain cycle without hardware.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --features std --bin chanlog_host
//! ```
//!
//! ## Commands
//!
//! - `config <ch> <interval_s> <capacity> [filter_len] [offset factor divisor]`
//!   - Apply and persist a channel configuration
//! - `show <ch>` - Show a channel's applied configuration
//! - `data <ch>` - Drain a channel's history (destructive)
//! - `enable <ch>` / `disable <ch>` - Toggle the sampling gate
//! - `run <ms>` - Advance the simulated clock, ticking the engine
//! - `reboot` - Drop the engine and reload it from the persisted store
//! - `sinks` - Show frames captured by the broadcast/publish sinks
//! - `clear` - Forget captured frames
//! - `help` - Show help
//! - `exit` - Exit shell

use std::io::{self, Write};

use chanlog::domain::distribution::AuxPublisher;
use chanlog::{
    ApiError, ApiRequest, ApiResponse, ConfigBody, Distributor, Engine, MemStore, NullEvents,
    RecordingBroadcast, RecordingPublish, SimAnalog,
};

/// Simulated tick granularity
const TICK_MS: u32 = 10;

struct Shell {
    engine: Engine,
    store: MemStore,
    source: SimAnalog,
    broadcast: RecordingBroadcast,
    publish: RecordingPublish,
    aux: AuxPublisher,
    now: u32,
}

fn main() {
    let mut shell = Shell {
        engine: Engine::new(),
        store: MemStore::new(),
        source: SimAnalog::default(),
        broadcast: RecordingBroadcast::new(),
        publish: RecordingPublish::new(),
        aux: AuxPublisher::default(),
        now: 0,
    };

    println!("chanlog host shell - type 'help' for commands");
    loop {
        print!("chanlog[t={}ms]> ", shell.now);
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = parts.split_first() else {
            continue;
        };

        match cmd {
            "config" => shell.cmd_config(args),
            "show" => shell.cmd_show(args),
            "data" => shell.cmd_data(args),
            "enable" => shell.cmd_gate(args, true),
            "disable" => shell.cmd_gate(args, false),
            "run" => shell.cmd_run(args),
            "reboot" => shell.cmd_reboot(),
            "sinks" => shell.cmd_sinks(),
            "clear" => {
                shell.broadcast.clear();
                shell.publish.clear();
                println!("sink logs cleared");
            }
            "help" => print_help(),
            "exit" | "quit" => break,
            other => println!("unknown command '{}', try 'help'", other),
        }
    }
}

impl Shell {
    fn cmd_config(&mut self, args: &[&str]) {
        let Some((channel, rest)) = parse_channel(args) else {
            println!("usage: config <ch> <interval_s> <capacity> [filter_len] [offset factor divisor]");
            return;
        };
        let (Some(interval_s), Some(capacity)) = (parse(rest, 0), parse(rest, 1)) else {
            println!("usage: config <ch> <interval_s> <capacity> [filter_len] [offset factor divisor]");
            return;
        };
        let body = ConfigBody {
            interval_s,
            capacity,
            enabled: true,
            filter_len: parse(rest, 2).unwrap_or(1),
            offset: parse(rest, 3).unwrap_or(0.0),
            factor: parse(rest, 4).unwrap_or(1.0),
            divisor: parse(rest, 5).unwrap_or(1.0),
        };
        let request = ApiRequest::SetConfig { channel, body };
        match self.engine.handle_request(request, self.now, &mut self.store) {
            ApiResponse::Ok => println!("channel {} configured and persisted", channel),
            response => print_error(&response),
        }
    }

    fn cmd_show(&mut self, args: &[&str]) {
        let Some((channel, _)) = parse_channel(args) else {
            println!("usage: show <ch>");
            return;
        };
        let request = ApiRequest::GetConfig { channel };
        match self.engine.handle_request(request, self.now, &mut self.store) {
            ApiResponse::Config { body } => {
                println!(
                    "channel {}: interval={}s capacity={} enabled={} filter_len={}",
                    channel, body.interval_s, body.capacity, body.enabled, body.filter_len
                );
                println!(
                    "  calibration: offset={} factor={} divisor={}",
                    body.offset, body.factor, body.divisor
                );
            }
            response => print_error(&response),
        }
    }

    fn cmd_data(&mut self, args: &[&str]) {
        let Some((channel, _)) = parse_channel(args) else {
            println!("usage: data <ch>");
            return;
        };
        let request = ApiRequest::GetData { channel };
        match self.engine.handle_request(request, self.now, &mut self.store) {
            ApiResponse::Data { samples, overflow } => {
                println!("{} sample(s), overflow={}", samples.len(), overflow);
                for sample in &samples {
                    println!("  t={:>8}ms  value={:.4}", sample.timestamp_ms, sample.value);
                }
            }
            response => print_error(&response),
        }
    }

    fn cmd_gate(&mut self, args: &[&str], enabled: bool) {
        let Some((channel, _)) = parse_channel(args) else {
            println!("usage: {} <ch>", if enabled { "enable" } else { "disable" });
            return;
        };
        let request = ApiRequest::GetConfig { channel };
        let body = match self.engine.handle_request(request, self.now, &mut self.store) {
            ApiResponse::Config { body } => body,
            response => {
                print_error(&response);
                return;
            }
        };
        let body = ConfigBody { enabled, ..body };
        let request = ApiRequest::SetConfig { channel, body };
        match self.engine.handle_request(request, self.now, &mut self.store) {
            ApiResponse::Ok => println!(
                "channel {} {}",
                channel,
                if enabled { "enabled" } else { "disabled" }
            ),
            response => print_error(&response),
        }
    }

    fn cmd_run(&mut self, args: &[&str]) {
        let Some(ms) = parse::<u32>(args, 0) else {
            println!("usage: run <ms>");
            return;
        };
        let before = self.broadcast.frames().len();
        let end = self.now.wrapping_add(ms);
        while self.now != end {
            let step = TICK_MS.min(end.wrapping_sub(self.now));
            self.now = self.now.wrapping_add(step);
            let mut events = NullEvents;
            let mut dist = Distributor::new(&mut self.broadcast, &mut self.publish, &mut events);
            self.engine.tick(self.now, &mut self.source, &mut dist);
            self.aux.tick(self.now, &mut self.source, &mut dist);
        }
        println!(
            "advanced to t={}ms, {} new sample(s) broadcast",
            self.now,
            self.broadcast.frames().len() - before
        );
    }

    fn cmd_reboot(&mut self) {
        self.engine = Engine::new();
        self.engine.load(self.now, &mut self.store);
        println!("engine reloaded from persisted store ({} key(s))", self.store.len());
    }

    fn cmd_sinks(&self) {
        println!("broadcast ({} frame(s)):", self.broadcast.frames().len());
        for (channel, sample) in self.broadcast.frames() {
            println!(
                "  ch{}  t={:>8}ms  value={:.4}",
                channel.value(),
                sample.timestamp_ms,
                sample.value
            );
        }
        println!("publish ({} frame(s)):", self.publish.frames().len());
        for (topic, payload) in self.publish.frames() {
            println!("  {:<12} {} byte(s)", topic.as_str(), payload.len());
        }
    }
}

fn parse_channel<'a>(args: &'a [&'a str]) -> Option<(u8, &'a [&'a str])> {
    let (first, rest) = args.split_first()?;
    Some((first.parse().ok()?, rest))
}

fn parse<T: std::str::FromStr>(args: &[&str], idx: usize) -> Option<T> {
    args.get(idx)?.parse().ok()
}

fn print_error(response: &ApiResponse) {
    match response {
        ApiResponse::Error { error } => match error {
            ApiError::InvalidChannel => println!("error: invalid channel index"),
            ApiError::NotConfigured => println!("error: channel not configured"),
            ApiError::Validation(reason) => println!("error: validation failed ({:?})", reason),
            ApiError::Persistence(reason) => {
                println!("error: applied but not persisted ({:?})", reason)
            }
            ApiError::MalformedRequest => println!("error: malformed request"),
        },
        other => println!("unexpected response: {:?}", other),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  config <ch> <interval_s> <capacity> [filter_len] [offset factor divisor]");
    println!("  show <ch>           - applied configuration");
    println!("  data <ch>           - drain history (destructive)");
    println!("  enable <ch>         - open the sampling gate");
    println!("  disable <ch>        - close the sampling gate");
    println!("  run <ms>            - advance the simulated clock");
    println!("  reboot              - reload engine from persisted store");
    println!("  sinks               - show captured outgoing frames");
    println!("  clear               - forget captured frames");
    println!("  exit                - quit");
}
