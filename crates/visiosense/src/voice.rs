//! Spoken commands.
//!
//! Speech recognition runs in an external program that prints one transcribed phrase per line on
//! its standard output. Phrases are matched against a few fixed commands, which open web pages.

use std::{
    ffi::OsStr,
    fmt,
    io::{BufRead, BufReader},
    process::{Child, Command, Stdio},
    thread,
};

use anyhow::{bail, Context};
use pawawwewism::Worker;

/// A recognized voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    OpenYoutube,
    OpenGoogle,
    OpenWhatsapp,
}

impl VoiceCommand {
    /// Finds a command in a transcribed phrase, ignoring case and surrounding words.
    pub fn parse(phrase: &str) -> Option<Self> {
        let phrase = phrase.to_lowercase();
        if phrase.contains("open youtube") {
            Some(Self::OpenYoutube)
        } else if phrase.contains("open google") {
            Some(Self::OpenGoogle)
        } else if phrase.contains("open whatsapp") {
            Some(Self::OpenWhatsapp)
        } else {
            None
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Self::OpenYoutube => "https://youtube.com",
            Self::OpenGoogle => "https://google.com",
            Self::OpenWhatsapp => "https://web.whatsapp.com",
        }
    }
}

impl fmt::Display for VoiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenYoutube => "open youtube",
            Self::OpenGoogle => "open google",
            Self::OpenWhatsapp => "open whatsapp",
        })
    }
}

/// Opens URLs, usually in a web browser.
pub trait UrlOpener: Send + 'static {
    fn open(&mut self, url: &str) -> anyhow::Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&mut self, url: &str) -> anyhow::Result<()> {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };

        let status = cmd
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to run URL opener for {url}"))?;
        if !status.success() {
            bail!("URL opener for {url} exited with {status}");
        }
        Ok(())
    }
}

/// Handles one transcribed phrase, opening the URL of the command it contains.
///
/// Returns the recognized command, if any.
pub fn dispatch(phrase: &str, opener: &mut dyn UrlOpener) -> Option<VoiceCommand> {
    log::debug!("heard: {phrase:?}");
    let command = VoiceCommand::parse(phrase)?;
    log::info!("voice command: {command}");
    if let Err(e) = opener.open(command.url()) {
        log::error!("failed to open {}: {e:#}", command.url());
    }
    Some(command)
}

/// Listens to an external speech recognizer in the background.
///
/// Dropping the listener stops the recognizer.
pub struct VoiceListener {
    child: Child,
}

impl VoiceListener {
    /// Starts the recognizer `program` and dispatches every phrase it prints to `opener`.
    pub fn spawn<P, A, S, O>(program: P, args: A, mut opener: O) -> anyhow::Result<Self>
    where
        P: AsRef<OsStr>,
        A: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
        O: UrlOpener,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start speech recognizer {:?}", program))?;
        let stdout = child
            .stdout
            .take()
            .context("recognizer stdout not captured")?;

        let mut dispatcher = Worker::builder()
            .name("voice commands")
            .spawn(move |phrase: String| {
                dispatch(&phrase, &mut opener);
            })?;

        thread::Builder::new()
            .name("voice listener".into())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    match line {
                        Ok(line) if line.trim().is_empty() => {}
                        Ok(line) => dispatcher.send(line),
                        Err(e) => {
                            log::warn!("failed to read from speech recognizer: {e}");
                            break;
                        }
                    }
                }
                log::warn!("speech recognizer stopped, voice commands disabled");
            })?;

        log::info!("voice recognition started");
        Ok(Self { child })
    }
}

impl Drop for VoiceListener {
    fn drop(&mut self) {
        self.child.kill().ok();
        self.child.wait().ok();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl UrlOpener for Recorder {
        fn open(&mut self, url: &str) -> anyhow::Result<()> {
            self.0.push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            VoiceCommand::parse("please Open YouTube now"),
            Some(VoiceCommand::OpenYoutube)
        );
        assert_eq!(
            VoiceCommand::parse("open google"),
            Some(VoiceCommand::OpenGoogle)
        );
        assert_eq!(
            VoiceCommand::parse("OPEN WHATSAPP"),
            Some(VoiceCommand::OpenWhatsapp)
        );
        assert_eq!(VoiceCommand::parse("open the door"), None);
        assert_eq!(VoiceCommand::parse("youtube"), None);
    }

    #[test]
    fn dispatch_opens_url() {
        let mut rec = Recorder::default();
        assert_eq!(
            dispatch("open whatsapp", &mut rec),
            Some(VoiceCommand::OpenWhatsapp)
        );
        assert_eq!(dispatch("hello", &mut rec), None);
        assert_eq!(rec.0, ["https://web.whatsapp.com"]);
    }

    struct ChannelOpener(mpsc::Sender<String>);

    impl UrlOpener for ChannelOpener {
        fn open(&mut self, url: &str) -> anyhow::Result<()> {
            self.0.send(url.to_string())?;
            Ok(())
        }
    }

    #[test]
    fn listener_dispatches_recognized_phrases() {
        let (tx, rx) = mpsc::channel();
        let script = "echo hello; echo; echo 'open google please'; sleep 10";
        let listener = VoiceListener::spawn("sh", ["-c", script], ChannelOpener(tx)).unwrap();
        let url = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(url, "https://google.com");
        drop(listener);
    }

    #[test]
    fn missing_recognizer_fails_to_spawn() {
        let (tx, _rx) = mpsc::channel();
        let err = VoiceListener::spawn("visiosense-no-such-recognizer", [""; 0], ChannelOpener(tx));
        assert!(err.is_err());
    }
}
