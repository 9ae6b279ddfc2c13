use std::path::Path;

use log::info;

use crate::domain::{
    AnalysisKind, AnalysisRecord, Category, DraftRecord, Email, EmailIdx, IngestRecord, PromptKey,
};
use crate::error::{Result, TriageError};
use crate::llm::{GenerationParams, TextGenerator};
use crate::mail::import::parse_message_file;
use crate::store::TriageRepository;
use crate::triage::interpret::{answer_question, categorize_email, draft_reply, extract_actions};
use crate::triage::pipeline::run_ingestion;
use crate::triage::thread::collect_thread_context;

/// User-facing actions. Each one reloads the documents it touches, changes
/// them and writes them back whole.
pub struct Agent<R, G> {
    repo: R,
    generator: G,
}

impl<R: TriageRepository, G: TextGenerator> Agent<R, G> {
    pub fn new(repo: R, generator: G) -> Self {
        Self { repo, generator }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Categorize + extract for every email. The inbox is saved first and the
    /// results log second; the two writes are independent.
    pub fn ingest(&self, params: GenerationParams) -> Result<Vec<IngestRecord>> {
        let mut inbox = self.repo.load_inbox()?;
        let prompts = self.repo.load_prompts()?;

        let records = run_ingestion(&self.generator, &mut inbox, &prompts, params);
        self.repo.save_inbox(&inbox)?;

        let mut results = self.repo.load_results()?;
        results.analyses.extend(records.iter().cloned().map(|result| {
            AnalysisRecord::now(AnalysisKind::IngestBatch { result })
        }));
        self.repo.save_results(&results)?;
        Ok(records)
    }

    pub fn categorize(&self, idx: EmailIdx, params: GenerationParams) -> Result<Category> {
        let mut inbox = self.repo.load_inbox()?;
        let template = self.template(PromptKey::Categorize)?;
        let email = email_mut(&mut inbox, idx)?;

        let category = categorize_email(&self.generator, email, &template, params);
        email.category = Some(category.clone());
        self.repo.save_inbox(&inbox)?;

        self.log_analysis(AnalysisKind::Categorize {
            email_idx: idx,
            output: category.clone(),
        })?;
        Ok(category)
    }

    pub fn extract_actions(&self, idx: EmailIdx, params: GenerationParams) -> Result<Vec<String>> {
        let mut inbox = self.repo.load_inbox()?;
        let template = self.template(PromptKey::ExtractActions)?;
        let email = email_mut(&mut inbox, idx)?;

        let items = extract_actions(&self.generator, email, &template, params);
        email.action_items = Some(items.clone());
        self.repo.save_inbox(&inbox)?;

        self.log_analysis(AnalysisKind::ExtractActions {
            email_idx: idx,
            output: items.clone(),
        })?;
        Ok(items)
    }

    /// Drafts a reply using the email's thread as context and saves it with a
    /// snapshot of the email's current category and action items.
    pub fn draft_reply(&self, idx: EmailIdx, params: GenerationParams) -> Result<DraftRecord> {
        let inbox = self.repo.load_inbox()?;
        let template = self.template(PromptKey::DraftReply)?;
        let email = email_ref(&inbox, idx)?;

        let context = collect_thread_context(&inbox, email.thread_id.as_deref());
        let body = draft_reply(&self.generator, email, &template, params, context.as_deref());
        let draft = DraftRecord::for_email(idx, email, body);

        let mut results = self.repo.load_results()?;
        results.drafts.push(draft.clone());
        self.repo.save_results(&results)?;
        info!("saved draft for email {idx}");
        Ok(draft)
    }

    pub fn chat(&self, idx: EmailIdx, question: &str, params: GenerationParams) -> Result<String> {
        let inbox = self.repo.load_inbox()?;
        let template = self.template(PromptKey::Chat)?;
        let email = email_ref(&inbox, idx)?;

        let answer = answer_question(&self.generator, email, &template, question, params)?;
        self.log_analysis(AnalysisKind::Chat {
            email_idx: idx,
            question: question.to_string(),
            output: answer.clone(),
        })?;
        Ok(answer)
    }

    pub fn archive(&self, idx: EmailIdx) -> Result<()> {
        let mut inbox = self.repo.load_inbox()?;
        email_mut(&mut inbox, idx)?.archived = true;
        self.repo.save_inbox(&inbox)?;
        info!("archived email {idx}");
        Ok(())
    }

    pub fn set_prompt(&self, key: PromptKey, template: &str) -> Result<()> {
        let mut prompts = self.repo.load_prompts()?;
        prompts.set_template(key, template);
        self.repo.save_prompts(&prompts)?;
        info!("updated prompt '{key}'");
        Ok(())
    }

    /// Appends a parsed `.eml` file to the inbox and returns its index.
    pub fn import_message(&self, path: &Path) -> Result<EmailIdx> {
        let email = parse_message_file(path)?;
        let mut inbox = self.repo.load_inbox()?;
        inbox.push(email);
        self.repo.save_inbox(&inbox)?;
        let idx = inbox.len() - 1;
        info!("imported {} as email {idx}", path.display());
        Ok(idx)
    }

    fn template(&self, key: PromptKey) -> Result<String> {
        Ok(self.repo.load_prompts()?.template(key)?.to_string())
    }

    fn log_analysis(&self, kind: AnalysisKind) -> Result<()> {
        let mut results = self.repo.load_results()?;
        results.analyses.push(AnalysisRecord::now(kind));
        self.repo.save_results(&results)
    }
}

fn email_ref(inbox: &[Email], idx: EmailIdx) -> Result<&Email> {
    let len = inbox.len();
    inbox
        .get(idx)
        .ok_or(TriageError::EmailIndexOutOfRange { index: idx, len })
}

fn email_mut(inbox: &mut [Email], idx: EmailIdx) -> Result<&mut Email> {
    let len = inbox.len();
    inbox
        .get_mut(idx)
        .ok_or(TriageError::EmailIndexOutOfRange { index: idx, len })
}

/// Indices of the emails matching the high-priority filter, in stored order.
pub fn urgent_indices(inbox: &[Email]) -> Vec<EmailIdx> {
    inbox
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_urgent())
        .map(|(i, _)| i)
        .collect()
}
