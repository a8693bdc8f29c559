//! User facing text. The rest of the crate only deals in [`Message`] values; turning them into
//! a sentence in the user's language happens here and nowhere else.

use core::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{ApplyOutcome, DisplayMode, Outcome, RefreshError, RefreshRate};

/// Language of the rendered messages
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

impl Locale {
    /// Picks the locale for a tag such as `en` or `ru`, falling back to English.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

/// Errors that occur while parsing a locale from a string
#[derive(Error, Debug)]
pub enum ParseLocaleError {
    #[error("Unknown language. Allowed values: `en`, `ru`")]
    UnknownLocale,
}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "ru" | "russian" => Ok(Locale::Russian),
            _ => Err(ParseLocaleError::UnknownLocale),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::English => write!(f, "en"),
            Locale::Russian => write!(f, "ru"),
        }
    }
}

/// Everything the tool can tell the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    CurrentMode(DisplayMode),
    AvailableModes,
    MenuEntry(usize, RefreshRate),
    NoModes,
    Choose,
    InvalidChoice,
    Applying(RefreshRate),
    Success,
    Restart,
    Validated(RefreshRate),
    QueryFailed,
    NotAvailable(RefreshRate),
    FailBadMode,
    FailTest(i32),
    FailApply(i32),
}

impl From<&RefreshError> for Message {
    fn from(error: &RefreshError) -> Self {
        match error {
            RefreshError::QueryFailure => Message::QueryFailed,
            RefreshError::NotAvailable(refresh_rate) => Message::NotAvailable(*refresh_rate),
            RefreshError::InvalidSelection(_) => Message::InvalidChoice,
            RefreshError::TestRejectedBadMode => Message::FailBadMode,
            RefreshError::TestFailed(code) => Message::FailTest(*code),
            RefreshError::CommitFailed(code) => Message::FailApply(*code),
        }
    }
}

impl From<ApplyOutcome> for Message {
    fn from(outcome: ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Applied(_) => Message::Success,
            ApplyOutcome::RestartRequired(_) => Message::Restart,
        }
    }
}

impl From<Outcome> for Message {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::NoAlternatives => Message::NoModes,
            Outcome::Applied(applied) => applied.into(),
        }
    }
}

/// Renders `message` in the given language.
pub fn render(locale: Locale, message: &Message) -> String {
    match locale {
        Locale::English => render_english(message),
        Locale::Russian => render_russian(message),
    }
}

fn render_english(message: &Message) -> String {
    match message {
        Message::CurrentMode(mode) => format!(
            "Current resolution: {}x{} @ {}Hz, {} bpp\n",
            mode.resolution.width, mode.resolution.height, mode.refresh_rate.0, mode.color_depth.0
        ),
        Message::AvailableModes => "Available refresh rates:".to_string(),
        Message::MenuEntry(number, refresh_rate) => format!("{} - {} Hz", number, refresh_rate.0),
        Message::NoModes => "No alternative refresh rates found for current resolution.".to_string(),
        Message::Choose => "Choose menu item (number): ".to_string(),
        Message::InvalidChoice => "Invalid choice.".to_string(),
        Message::Applying(refresh_rate) => format!("\nApplying {} Hz...", refresh_rate.0),
        Message::Success => "Refresh rate changed successfully.".to_string(),
        Message::Restart => "Settings saved. System restart required to apply.".to_string(),
        Message::Validated(refresh_rate) => format!("Driver accepts {} Hz. Nothing was changed.", refresh_rate.0),
        Message::QueryFailed => "Failed to get display settings.".to_string(),
        Message::NotAvailable(refresh_rate) => {
            format!("{} Hz is not available for current resolution.", refresh_rate.0)
        }
        Message::FailBadMode => "Driver rejected the mode (BADMODE).".to_string(),
        Message::FailTest(code) => format!("Test of mode failed. Code: {}", code),
        Message::FailApply(code) => format!("Could not apply mode. Code: {}", code),
    }
}

fn render_russian(message: &Message) -> String {
    match message {
        Message::CurrentMode(mode) => format!(
            "Текущее разрешение: {}x{} @ {}Гц, {} bpp\n",
            mode.resolution.width, mode.resolution.height, mode.refresh_rate.0, mode.color_depth.0
        ),
        Message::AvailableModes => "Доступные частоты обновления:".to_string(),
        Message::MenuEntry(number, refresh_rate) => format!("{} - {} Гц", number, refresh_rate.0),
        Message::NoModes => "Не найдено альтернативных частот обновления для текущего разрешения.".to_string(),
        Message::Choose => "Выберите пункт меню (число): ".to_string(),
        Message::InvalidChoice => "Некорректный выбор.".to_string(),
        Message::Applying(refresh_rate) => format!("\nПрименяю {} Гц...", refresh_rate.0),
        Message::Success => "Частота успешно изменена.".to_string(),
        Message::Restart => "Параметры сохранены. Для применения требуется перезагрузка системы.".to_string(),
        Message::Validated(refresh_rate) => format!("Драйвер принимает {} Гц. Ничего не изменено.", refresh_rate.0),
        Message::QueryFailed => "Не удалось получить параметры дисплея.".to_string(),
        Message::NotAvailable(refresh_rate) => {
            format!("Частота {} Гц недоступна для текущего разрешения.", refresh_rate.0)
        }
        Message::FailBadMode => "Драйвер отклонил режим (BADMODE).".to_string(),
        Message::FailTest(code) => format!("Тест режима не прошёл. Код: {}", code),
        Message::FailApply(code) => format!("Не удалось применить режим. Код: {}", code),
    }
}
