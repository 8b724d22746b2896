//! C5 — Debate Orchestrator: the multi-round debate state machine (§4.5).
//!
//! `Idle → Plan → Round(1..R) → Vote → Finalize → Done`, with `Aborted` as a
//! sink. Round boundaries are strict barriers (§5): round N's messages are
//! never built before every round N−1 call has settled, success or failure.

mod events;
mod parse;
mod prompts;
mod weights;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use council_consensus::{self as consensus, ConsensusConfig};
use council_core::{ConsensusMode, Decision, DebateMeta, Message, Task, Vote};
use council_history::HistoryStore;
use council_quota::QuotaManager;
use council_supervisor::Supervisor;
use council_team::TeamSelector;
use futures::future::join_all;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};

pub use events::DebateEvent;
pub use weights::WeightMap;

const EVENT_CHANNEL_CAPACITY: usize = 256;
const STUB_OPINION: &str = "[Unable to provide opinion]";
const FAILED_VOTE_COMMENT: &str = "Failed to vote";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Total rounds including the final vote round is `max_rounds + 1`;
    /// `max_rounds` counts the opinion-gathering rounds (§4.5 "Round 1",
    /// "Rounds 2..R").
    pub max_rounds: u32,
    pub consensus_mode: ConsensusMode,
    pub consensus_threshold: f64,
    pub persist_history: bool,
    pub session_id: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            consensus_mode: ConsensusMode::Weighted,
            consensus_threshold: 0.5,
            persist_history: true,
            session_id: None,
        }
    }
}

pub struct Orchestrator {
    supervisors: RwLock<Vec<Arc<dyn Supervisor>>>,
    quota: Arc<QuotaManager>,
    team_selector: TeamSelector,
    weights: WeightMap,
    history: Option<Arc<HistoryStore>>,
    events: broadcast::Sender<DebateEvent>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        quota: Arc<QuotaManager>,
        team_selector: TeamSelector,
        history: Option<Arc<HistoryStore>>,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            supervisors: RwLock::new(Vec::new()),
            quota,
            team_selector,
            weights: WeightMap::new(),
            history,
            events: tx,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DebateEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DebateEvent) {
        let _ = self.events.send(event);
    }

    pub async fn register_supervisor(&self, supervisor: Arc<dyn Supervisor>) {
        self.supervisors.write().await.push(supervisor);
    }

    pub async fn set_weight(&self, name: impl Into<String>, weight: f64) {
        self.weights.set(name, weight).await;
    }

    /// §4.5 operation: `debate(task) -> Decision`.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn debate(&self, task: Task) -> Result<Decision> {
        let start = Instant::now();
        let supervisors = self.supervisors.read().await.clone();

        // Plan: probe availability in parallel, ignoring individual failures.
        let availability = join_all(supervisors.iter().map(|s| {
            let s = s.clone();
            async move { (s.name().to_string(), s.available().await) }
        }))
        .await;
        let available: Vec<String> = availability.into_iter().filter(|(_, ok)| *ok).map(|(name, _)| name).collect();

        let selection = self.team_selector.select_team(&task, &available);
        if selection.team.is_empty() {
            info!("no supervisors available — auto-approving");
            let decision = Decision::from_votes(true, vec![], "No supervisors available — auto-approving".to_string());
            self.maybe_persist(&task, &decision, &selection, 0, start.elapsed().as_millis() as u64).await?;
            self.emit(DebateEvent::Finalized { task_id: task.id.clone(), approved: true });
            return Ok(decision);
        }

        let team: Vec<Arc<dyn Supervisor>> = selection
            .team
            .iter()
            .filter_map(|name| supervisors.iter().find(|s| s.name() == name).cloned())
            .collect();
        let weight_snapshot = self.weights.snapshot(&selection.team).await;

        self.emit(DebateEvent::Started { task_id: task.id.clone(), team: selection.team.clone() });

        let any_success = AtomicBool::new(false);

        // Round 1.
        let mut context = vec![Message::user(prompts::format_task(&task))];
        let opinions = self.fan_out_round(&team, &context, &any_success).await;
        let mut last_opinions: Vec<(String, String)> = opinions
            .into_iter()
            .map(|(name, reply)| (name, reply.map(|(text, _)| text).unwrap_or_else(|| STUB_OPINION.to_string())))
            .collect();

        let mut rounds_used = 1;
        for round in 2..=self.config.max_rounds {
            context.push(Message::assistant(prompts::format_round_context(&last_opinions)));
            let opinions = self.fan_out_round(&team, &context, &any_success).await;
            self.emit(DebateEvent::RoundCompleted {
                task_id: task.id.clone(),
                round,
                opinions: opinions.iter().filter(|(_, o)| o.is_some()).count(),
            });
            // §4.5 "Drop null results; they do not re-enter the context."
            last_opinions = opinions.into_iter().filter_map(|(name, reply)| reply.map(|(text, _)| (name, text))).collect();
            rounds_used = round;
        }

        // Vote.
        context.push(Message::user(prompts::VOTE_PROMPT));
        let vote_replies = self.fan_out_round(&team, &context, &any_success).await;

        if !any_success.load(Ordering::SeqCst) {
            // Deliberately not `Decision::from_votes` — that helper treats an
            // empty vote list as full (vacuous) consensus, but §7 calls for
            // `consensus=0` specifically when every supervisor failed.
            let decision = Decision {
                approved: false,
                consensus: 0.0,
                weighted_consensus: 0.0,
                votes: vec![],
                reasoning: "all supervisors unreachable".to_string(),
                strong_dissent: vec![],
            };
            self.maybe_persist(&task, &decision, &selection, rounds_used, start.elapsed().as_millis() as u64).await?;
            self.emit(DebateEvent::Aborted { task_id: task.id.clone(), reason: "all supervisors unreachable".to_string() });
            return Ok(decision);
        }

        let votes: Vec<Vote> = vote_replies
            .into_iter()
            .map(|(name, reply)| {
                let weight = weight_snapshot.get(&name).copied().unwrap_or(1.0);
                match reply {
                    Some((text, latency_ms)) => {
                        let parsed = parse::parse_vote(&text);
                        Vote {
                            supervisor: name,
                            approved: parsed.approved,
                            confidence: parsed.confidence,
                            weight,
                            comment: parsed.comment,
                            response_time_ms: latency_ms,
                        }
                    }
                    None => Vote {
                        supervisor: name,
                        approved: false,
                        confidence: 0.5,
                        weight,
                        comment: FAILED_VOTE_COMMENT.to_string(),
                        response_time_ms: 0,
                    },
                }
            })
            .collect();

        // Finalize.
        let consensus_config = ConsensusConfig { threshold: self.config.consensus_threshold, lead: selection.lead.clone() };
        let result = consensus::evaluate(self.config.consensus_mode, &votes, &consensus_config);
        let reasoning = build_reasoning(&result.reasoning, &votes, &selection.lead);
        let decision = Decision::from_votes(result.approved, votes, reasoning);

        self.maybe_persist(&task, &decision, &selection, rounds_used, start.elapsed().as_millis() as u64).await?;
        self.emit(DebateEvent::Finalized { task_id: task.id.clone(), approved: decision.approved });
        Ok(decision)
    }

    /// `chatWithFallback(messages)` (§4.5) for non-debate single-query calls:
    /// try `lead`, then each name in `fallback_chain` in order, then any
    /// available supervisor. Returns `(text, supervisorName)`.
    pub async fn chat_with_fallback(
        &self,
        messages: &[Message],
        lead: Option<&str>,
        fallback_chain: &[String],
    ) -> Option<(String, String)> {
        let supervisors = self.supervisors.read().await.clone();
        let ordered_names: Vec<String> = lead
            .into_iter()
            .map(String::from)
            .chain(fallback_chain.iter().cloned())
            .collect();

        for name in &ordered_names {
            if let Some(sup) = supervisors.iter().find(|s| s.name() == name) {
                if !sup.available().await {
                    continue;
                }
                if let Some((text, _)) = self.quota_wrapped_chat(sup, messages).await {
                    return Some((text, sup.name().to_string()));
                }
            }
        }

        for sup in &supervisors {
            if ordered_names.iter().any(|n| n == sup.name()) {
                continue;
            }
            if !sup.available().await {
                continue;
            }
            if let Some((text, _)) = self.quota_wrapped_chat(sup, messages).await {
                return Some((text, sup.name().to_string()));
            }
        }

        None
    }

    /// Fan out `messages` to every supervisor in `team` in parallel and wait
    /// for all to settle (§5 "round boundaries are strict barriers"). Each
    /// reply carries the measured round-trip latency alongside the text.
    async fn fan_out_round(
        &self,
        team: &[Arc<dyn Supervisor>],
        messages: &[Message],
        any_success: &AtomicBool,
    ) -> Vec<(String, Option<(String, u64)>)> {
        let futs = team.iter().map(|sup| {
            let sup = sup.clone();
            let messages = messages.to_vec();
            async move {
                let reply = self.quota_wrapped_chat(&sup, &messages).await;
                (sup.name().to_string(), reply)
            }
        });
        let results = join_all(futs).await;
        if results.iter().any(|(_, r)| r.is_some()) {
            any_success.store(true, Ordering::SeqCst);
        }
        results
    }

    /// Every `chat()` call wrapped in quota accounting (§4.5 "Quota
    /// integration"). A denial is treated as a failure for that call — no
    /// blocking sleep happens inside the orchestrator (§5 "Backpressure").
    /// Returns the reply text paired with the measured latency so callers
    /// can record it on the resulting `Vote` (§3 "response time").
    async fn quota_wrapped_chat(&self, sup: &Arc<dyn Supervisor>, messages: &[Message]) -> Option<(String, u64)> {
        let provider = sup.provider().to_string();
        let check = self.quota.check(&provider).await;
        if !check.allowed {
            debug!(provider, reason = ?check.reason, "quota denied supervisor call, counted as a failure");
            return None;
        }

        self.quota.start(&provider).await;
        let started = Instant::now();
        let result = sup.chat(messages).await;
        self.quota.finish(&provider).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(text) => {
                // No real token accounting is available above the
                // `Supervisor` trait boundary; approximate from reply length.
                let tokens = (text.len() / 4).max(1) as u64;
                self.quota.record(&provider, tokens, latency_ms, true).await;
                Some((text, latency_ms))
            }
            Err(err) => {
                if err.is_rate_limit() {
                    self.quota.record_rate_limit_error(&provider).await;
                }
                self.quota.record(&provider, 0, latency_ms, false).await;
                warn!(supervisor = sup.name(), provider, error = %err, "supervisor call failed, isolated to this call");
                None
            }
        }
    }

    async fn maybe_persist(
        &self,
        task: &Task,
        decision: &Decision,
        selection: &council_team::TeamSelection,
        rounds_used: u32,
        duration_ms: u64,
    ) -> Result<()> {
        if !self.config.persist_history {
            return Ok(());
        }
        let Some(ref history) = self.history else { return Ok(()) };

        let meta = DebateMeta {
            rounds_used,
            consensus_mode: self.config.consensus_mode,
            lead_supervisor: selection.lead.clone(),
            dynamic_selection_summary: selection.reasoning.clone(),
            duration_ms,
            participating_supervisors: decision.votes.iter().map(|v| v.supervisor.clone()).collect(),
            session_id: self.config.session_id.clone(),
            task_type: Some(selection.task_type.as_str().to_string()),
        };
        history.save(task.clone(), decision.clone(), meta).await?;
        Ok(())
    }
}

/// §4.5 "Construct the reasoning string (mode explanation, tallies, lead
/// annotation, dissent bullets, per-vote excerpts)".
fn build_reasoning(mode_reasoning: &str, votes: &[Vote], lead: &Option<String>) -> String {
    let mut lines = vec![mode_reasoning.to_string()];

    if let Some(lead) = lead {
        if let Some(vote) = votes.iter().find(|v| &v.supervisor == lead) {
            lines.push(format!("Lead ({lead}): {}", if vote.approved { "APPROVE" } else { "REJECT" }));
        }
    }

    for vote in votes {
        if vote.is_strong_dissent() {
            lines.push(format!("Dissent ({}): {}", vote.supervisor, vote.excerpt()));
        }
    }

    for vote in votes {
        lines.push(format!(
            "{} ({}): {}",
            vote.supervisor,
            if vote.approved { "APPROVE" } else { "REJECT" },
            vote.excerpt()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_supervisor::MockSupervisor;
    use council_team::TeamSelector;

    fn orchestrator(mode: ConsensusMode) -> Orchestrator {
        let config = OrchestratorConfig { max_rounds: 2, consensus_mode: mode, persist_history: false, ..Default::default() };
        Orchestrator::new(config, Arc::new(QuotaManager::new(0.8)), TeamSelector::default(), None)
    }

    #[tokio::test]
    async fn auto_approves_with_no_registered_supervisors() {
        let orch = orchestrator(ConsensusMode::Weighted);
        let decision = orch.debate(Task::new("t1", "anything")).await.unwrap();
        assert!(decision.approved);
        assert_eq!(decision.consensus, 1.0);
        assert!(decision.votes.is_empty());
    }

    #[tokio::test]
    async fn all_approve_under_unanimous() {
        let orch = orchestrator(ConsensusMode::Unanimous);
        orch.register_supervisor(Arc::new(
            MockSupervisor::new("gpt-4", "openai").replying("VOTE: APPROVE\nCONFIDENCE: 0.9\nREASONING: fine"),
        ))
        .await;
        orch.register_supervisor(Arc::new(
            MockSupervisor::new("claude", "anthropic").replying("VOTE: APPROVE\nCONFIDENCE: 0.8\nREASONING: fine"),
        ))
        .await;

        let decision = orch.debate(Task::new("t1", "do the thing")).await.unwrap();
        assert!(decision.approved);
        assert_eq!(decision.votes.len(), 2);
    }

    #[tokio::test]
    async fn failing_supervisor_is_isolated_not_fatal() {
        let orch = orchestrator(ConsensusMode::SimpleMajority);
        orch.register_supervisor(Arc::new(
            MockSupervisor::new("gpt-4", "openai").replying("VOTE: APPROVE\nCONFIDENCE: 0.9\nREASONING: fine"),
        ))
        .await;
        orch.register_supervisor(Arc::new(MockSupervisor::new("flaky", "grok").failing("boom"))).await;

        let decision = orch.debate(Task::new("t1", "do the thing")).await.unwrap();
        assert_eq!(decision.votes.len(), 2);
        let flaky_vote = decision.votes.iter().find(|v| v.supervisor == "flaky").unwrap();
        assert_eq!(flaky_vote.comment, FAILED_VOTE_COMMENT);
        assert!(!flaky_vote.approved);
    }

    #[tokio::test]
    async fn all_supervisors_unreachable_aborts_with_zero_consensus() {
        let orch = orchestrator(ConsensusMode::SimpleMajority);
        orch.register_supervisor(Arc::new(MockSupervisor::new("flaky-a", "grok").failing("boom"))).await;
        orch.register_supervisor(Arc::new(MockSupervisor::new("flaky-b", "qwen").failing("boom"))).await;

        let decision = orch.debate(Task::new("t1", "do the thing")).await.unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.consensus, 0.0);
        assert_eq!(decision.reasoning, "all supervisors unreachable");
    }
}
