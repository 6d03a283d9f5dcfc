//! Interactive single-file mode (§6.3 `standalone`, no `--repopath`): prompt
//! for the file, the author chain, the activity, and any used entities,
//! offering the last remembered answer as a default for each (§4.4 is
//! "soundbites not a clean step", the interactivity itself is a human
//! cross-check rather than an automatable pipeline stage).
//!
//! All I/O is behind `BufRead`/`Write` so the Q&A flow can be driven by a
//! scripted transcript in tests instead of a real terminal.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::DateTime;
use provtool_core::constants::TIMESTAMP_FORMAT;
use provtool_core::types::ProvTimestamp;
use provtool_core::ProvtoolError;
use provtool_model::AgentNode;

use crate::memo::MemoStore;

const BAR: &str = "##############################";

/// Everything gathered from one interactive run, ready to hand to
/// [`crate::writer::write_prov_file`].
pub struct StandaloneAnswers {
    pub entity_path: PathBuf,
    pub agent: AgentNode,
    pub activity_time: ProvTimestamp,
    pub location: String,
    pub label: String,
    pub means: String,
    pub used: Vec<String>,
}

pub struct Session<'a, R, W> {
    memo: &'a MemoStore,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(memo: &'a MemoStore, input: R, output: W) -> Self {
        Self { memo, input, output }
    }

    fn heading(&mut self, text: &str) -> Result<(), ProvtoolError> {
        writeln!(self.output, "\n\n{BAR}\n{text}\n{BAR}")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, ProvtoolError> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn yn(&mut self, label: &str) -> Result<bool, ProvtoolError> {
        loop {
            write!(self.output, "{label}")?;
            self.output.flush()?;
            match self.read_line()?.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => continue,
            }
        }
    }

    /// Ask for `key`, offering the remembered value as a default. Returns
    /// the answer and remembers it for next time.
    fn ask(&mut self, key: &str, question_label: Option<&str>) -> Result<String, ProvtoolError> {
        let remembered = self.memo.get(key)?;
        if let Some(default) = &remembered {
            if self.yn(&format!("Keep the following entry for {key}: {default} [y/n]"))? {
                return Ok(default.clone());
            }
        }
        let prompt = question_label
            .map(str::to_string)
            .unwrap_or_else(|| format!("Please enter a value for {key}: \n"));
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let value = self.read_line()?;
        self.memo.set(key, &value)?;
        Ok(value)
    }

    /// Run the full Q&A flow described in §6.3.
    pub fn run(&mut self) -> Result<StandaloneAnswers, ProvtoolError> {
        self.heading("File")?;
        let entity_path = PathBuf::from(self.ask("entity_path", None)?);

        self.heading("Author")?;
        let mut chain: Vec<(String, String)> = Vec::new();
        loop {
            let family_name = self.ask("author_family_name", None)?;
            let given_name = self.ask("author_given_name", None)?;
            chain.push((given_name, family_name));
            if !self.yn("Are there more authors? [y/n]")? {
                break;
            }
            self.heading("Author")?;
        }
        // `chain[0]` is the primary author; each subsequent entry acts on
        // behalf of the one before it, so the chain is built from the tail.
        let mut agent: Option<AgentNode> = None;
        for (given, family) in chain.into_iter().rev() {
            agent = Some(AgentNode::person(given, family, agent));
        }
        let agent = agent.ok_or(ProvtoolError::NoAgentDefined)?;

        self.heading("Activity")?;
        let location = self.ask("activity_location", None)?;
        let label = self.ask("activity_label", None)?;
        let means = self.ask("activity_means", None)?;
        let activity_time_str = self.ask("activity_time", None)?;
        let activity_time = DateTime::parse_from_str(&activity_time_str, TIMESTAMP_FORMAT)
            .map_err(|e| ProvtoolError::Other(format!("invalid activity_time {activity_time_str:?}: {e}")))?;

        let mut used = Vec::new();
        if self.yn("Are there used entities? [y/n]")? {
            loop {
                used.push(self.ask("entity_id", None)?);
                if !self.yn("Are there more used entities? [y/n]")? {
                    break;
                }
            }
        }

        Ok(StandaloneAnswers {
            entity_path,
            agent,
            activity_time,
            location,
            label,
            means,
            used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scripted(lines: &[&str]) -> Cursor<Vec<u8>> {
        Cursor::new(lines.join("\n").into_bytes())
    }

    #[test]
    fn single_author_no_used_entities() {
        let memo = MemoStore::in_memory().unwrap();
        let input = scripted(&[
            "a.txt",     // entity_path
            "Lovelace",  // author_family_name
            "Ada",       // author_given_name
            "n",         // more authors?
            "lab",       // activity_location
            "analysis",  // activity_label
            "manual",    // activity_means
            "2026-01-01T00:00:00+0000", // activity_time
            "n",         // used entities?
        ]);
        let mut output = Vec::new();
        let mut session = Session::new(&memo, input, &mut output);
        let answers = session.run().unwrap();

        assert_eq!(answers.entity_path, PathBuf::from("a.txt"));
        assert!(answers.used.is_empty());
        assert!(answers.agent.acted_on_behalf_of.is_none());
    }

    #[test]
    fn two_authors_chain_in_asked_order() {
        let memo = MemoStore::in_memory().unwrap();
        let input = scripted(&[
            "a.txt",
            "Lovelace", "Ada", "y",
            "Hopper", "Grace", "n",
            "lab", "analysis", "manual",
            "2026-01-01T00:00:00+0000",
            "n",
        ]);
        let mut output = Vec::new();
        let mut session = Session::new(&memo, input, &mut output);
        let answers = session.run().unwrap();

        let principal = answers.agent.acted_on_behalf_of.unwrap();
        match principal.kind {
            provtool_model::AgentKind::Person { given_name, .. } => assert_eq!(given_name, "Grace"),
            _ => panic!("expected a person"),
        }
    }

    #[test]
    fn used_entities_are_collected() {
        let memo = MemoStore::in_memory().unwrap();
        let input = scripted(&[
            "a.txt",
            "Lovelace", "Ada", "n",
            "lab", "analysis", "manual",
            "2026-01-01T00:00:00+0000",
            "y",
            "entity-one", "y",
            "entity-two", "n",
        ]);
        let mut output = Vec::new();
        let mut session = Session::new(&memo, input, &mut output);
        let answers = session.run().unwrap();

        assert_eq!(answers.used, vec!["entity-one".to_string(), "entity-two".to_string()]);
    }

    #[test]
    fn remembered_answer_is_reused_when_kept() {
        let memo = MemoStore::in_memory().unwrap();
        memo.set("author_family_name", "Lovelace").unwrap();

        let input = scripted(&[
            "a.txt",
            "y",   // keep remembered family name
            "Ada", // given name
            "n",
            "lab", "analysis", "manual",
            "2026-01-01T00:00:00+0000",
            "n",
        ]);
        let mut output = Vec::new();
        let mut session = Session::new(&memo, input, &mut output);
        let answers = session.run().unwrap();

        match answers.agent.kind {
            provtool_model::AgentKind::Person { family_name, .. } => assert_eq!(family_name, "Lovelace"),
            _ => panic!("expected a person"),
        }
    }
}
