#![cfg_attr(not(windows), allow(dead_code))]

use std::io::{BufRead, Write};
#[cfg(windows)]
use std::io;
use std::process::ExitCode;

use color_eyre::Result;
use log::debug;
use structopt::StructOpt;

use refreshz::messages::{render, Locale, Message};
use refreshz::{ModeChanger, ModeSource, RefreshError, RefreshRate, RefreshSession, Target};

#[derive(StructOpt, Debug)]
#[structopt(name = "refreshz", about = "Query and change the refresh rate of the primary display")]
struct Opt {
    /// Language of the messages: `en` or `ru`
    lang: Option<String>,

    /// Switch to this refresh rate instead of asking
    #[structopt(long)]
    hz: Option<RefreshRate>,

    /// Switch to the highest available refresh rate instead of asking
    #[structopt(long, conflicts_with = "hz")]
    highest: bool,

    /// Only print the current mode and the available refresh rates
    #[structopt(long, conflicts_with_all = &["hz", "highest"])]
    list: bool,

    /// Print the listing as JSON
    #[structopt(long, requires = "list")]
    json: bool,

    /// Ask the driver whether the mode would be accepted, without changing anything
    #[structopt(long)]
    dry_run: bool,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opt = Opt::from_args();
    let locale = opt.lang.as_deref().map(Locale::from_tag).unwrap_or_default();
    debug!("{:?}, locale {}", opt, locale);

    run(&opt, locale)
}

/// How the process should exit once a run is over
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

#[cfg(windows)]
fn run(opt: &Opt, locale: Locale) -> Result<ExitCode> {
    let mut display = refreshz::PrimaryDisplay::new();
    let exit = execute(&mut display, opt, locale, &mut io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(exit.into())
}

#[cfg(not(windows))]
fn run(_opt: &Opt, _locale: Locale) -> Result<ExitCode> {
    Err(color_eyre::eyre::eyre!("Changing the refresh rate is only supported on Windows"))
}

/// Writes the side effects of one run to `output` and reads the menu choice from `input`.
struct Console<'a, R, W> {
    locale: Locale,
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Console<'_, R, W> {
    fn say(&mut self, message: Message) -> Result<()> {
        writeln!(self.output, "{}", render(self.locale, &message))?;
        Ok(())
    }

    fn fail(&mut self, error: &RefreshError) -> Result<Exit> {
        debug!("Giving up: {}", error);
        self.say(Message::from(error))?;
        Ok(Exit::Failure)
    }

    fn print_menu(&mut self, session: &RefreshSession) -> Result<()> {
        self.say(Message::AvailableModes)?;
        for (number, refresh_rate) in session.candidates.iter().enumerate() {
            self.say(Message::MenuEntry(number + 1, refresh_rate))?;
        }
        Ok(())
    }

    fn ask_choice(&mut self) -> Result<String> {
        write!(self.output, "{}", render(self.locale, &Message::Choose))?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}

fn execute<D, R, W>(display: &mut D, opt: &Opt, locale: Locale, input: &mut R, output: &mut W) -> Result<Exit>
where
    D: ModeSource + ModeChanger,
    R: BufRead,
    W: Write,
{
    let mut console = Console { locale, input, output };

    let session = match RefreshSession::open(&*display) {
        Ok(session) => session,
        Err(error) => return console.fail(&error),
    };

    if opt.json {
        writeln!(console.output, "{}", serde_json::to_string_pretty(&session)?)?;
        return Ok(Exit::Success);
    }

    console.say(Message::CurrentMode(session.current.clone()))?;

    let target = match (opt.hz, opt.highest) {
        (Some(refresh_rate), _) => Target::Frequency(refresh_rate),
        (None, true) => Target::Highest,
        (None, false) if session.candidates.is_empty() => Target::Highest,
        (None, false) => {
            console.print_menu(&session)?;
            if opt.list {
                return Ok(Exit::Success);
            }
            Target::MenuChoice(console.ask_choice()?)
        }
    };

    let refresh_rate = match session.resolve(&target) {
        Ok(Some(refresh_rate)) => refresh_rate,
        Ok(None) => {
            console.say(Message::NoModes)?;
            return Ok(Exit::Success);
        }
        Err(error) => return console.fail(&error),
    };

    console.say(Message::Applying(refresh_rate))?;

    if opt.dry_run {
        return match session.validate(display, refresh_rate) {
            Ok(()) => {
                console.say(Message::Validated(refresh_rate))?;
                Ok(Exit::Success)
            }
            Err(error) => console.fail(&error),
        };
    }

    match session.apply(display, refresh_rate) {
        Ok(outcome) => {
            console.say(outcome.into())?;
            Ok(Exit::Success)
        }
        Err(error) => console.fail(&error),
    }
}
