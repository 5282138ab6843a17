//! Input gate: at most one round request in flight per session.
//!
//! Every manual submission and every auto-mode request passes through
//! [`InputGate`], which owns the session's pending-action flag. The flag is
//! set when a request is admitted and cleared only by [`InputGate::release`],
//! which the session worker calls once the round has been reconciled or the
//! request has failed.
use serde::{Deserialize, Serialize};
use tracing::debug;

use battle_protocol::{Cooldowns, SkillId};

use super::SessionState;

/// Enablement of the action controls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    /// A request is in flight or a round is still being played back.
    pub locked: bool,
    /// Auto mode drives the battle; manual controls stay disabled.
    pub auto_mode: bool,
    /// The battle is over.
    pub finished: bool,
    /// Cooldowns from the last reconciled round.
    pub cooldowns: Cooldowns,
}

impl ControlState {
    /// Whether the control for `skill` should accept input.
    pub fn is_enabled(&self, skill: SkillId) -> bool {
        !self.locked && !self.auto_mode && !self.finished && self.cooldowns.is_ready(skill)
    }
}

/// Why a submission was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRejection {
    ActionPending,
    AutoMode,
    OnCooldown { skill: SkillId, remaining: u32 },
    GameOver,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRejection::ActionPending => write!(f, "an action is already in progress"),
            GateRejection::AutoMode => write!(f, "auto mode is active"),
            GateRejection::OnCooldown { skill, remaining } => write!(
                f,
                "{} is on cooldown for {remaining} more round(s)",
                skill.label()
            ),
            GateRejection::GameOver => write!(f, "the battle is over"),
        }
    }
}

/// Outcome of [`InputGate::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// The request may be sent; the session is now pending.
    Accepted,
    /// No session is active; nothing happened.
    Ignored,
    /// The request was refused; session state is unchanged.
    Rejected(GateRejection),
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted)
    }
}

#[derive(Debug, Default)]
pub struct InputGate {
    controls: ControlState,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// Admits a manual skill request.
    pub fn submit(&mut self, session: Option<&mut SessionState>, skill: SkillId) -> GateDecision {
        let Some(session) = session else {
            debug!(target: "runtime::session", %skill, "submit without session ignored");
            return GateDecision::Ignored;
        };

        let rejection = if session.is_finished() {
            Some(GateRejection::GameOver)
        } else if session.is_action_pending {
            Some(GateRejection::ActionPending)
        } else if session.is_auto_mode {
            Some(GateRejection::AutoMode)
        } else if !self.controls.cooldowns.is_ready(skill) {
            Some(GateRejection::OnCooldown {
                skill,
                remaining: self.controls.cooldowns.remaining(skill),
            })
        } else {
            None
        };

        if let Some(rejection) = rejection {
            debug!(target: "runtime::session", %skill, ?rejection, "submit rejected");
            return GateDecision::Rejected(rejection);
        }

        self.lock(session);
        GateDecision::Accepted
    }

    /// Admits an auto-mode round request. Returns false when one is already
    /// pending or the battle is over.
    pub fn claim_for_auto(&mut self, session: &mut SessionState) -> bool {
        if session.is_action_pending || session.is_finished() || !session.is_auto_mode {
            return false;
        }
        self.lock(session);
        true
    }

    /// Clears the pending flag. Idempotent: returns false if nothing was pending.
    pub fn release(&mut self, session: &mut SessionState) -> bool {
        if !session.is_action_pending {
            return false;
        }
        session.is_action_pending = false;
        self.sync_flags(session);
        true
    }

    /// Adopts the cooldowns of a reconciled round. Returns true if they changed.
    pub fn refresh_cooldowns(&mut self, cooldowns: &Cooldowns) -> bool {
        if self.controls.cooldowns == *cooldowns {
            return false;
        }
        self.controls.cooldowns = cooldowns.clone();
        true
    }

    /// Re-derives the control flags from the session.
    pub fn sync_flags(&mut self, session: &SessionState) {
        self.controls.locked = session.is_action_pending;
        self.controls.auto_mode = session.is_auto_mode;
        self.controls.finished = session.is_finished();
    }

    /// Forgets everything about the previous session.
    pub fn reset(&mut self) {
        self.controls = ControlState::default();
    }

    fn lock(&mut self, session: &mut SessionState) {
        session.is_action_pending = true;
        self.sync_flags(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionToken;
    use battle_protocol::{Difficulty, GameId};

    fn session(auto: bool) -> SessionState {
        SessionState::new(
            SessionToken::new(1),
            GameId(1),
            "Ari".to_string(),
            Difficulty::Normal,
            auto,
            1,
        )
    }

    #[test]
    fn submit_without_session_is_ignored() {
        let mut gate = InputGate::new();
        assert_eq!(gate.submit(None, SkillId::ATTACK), GateDecision::Ignored);
        assert!(!gate.controls().locked);
    }

    #[test]
    fn second_submit_is_rejected_until_release() {
        let mut gate = InputGate::new();
        let mut session = session(false);

        assert_eq!(
            gate.submit(Some(&mut session), SkillId::ATTACK),
            GateDecision::Accepted
        );
        assert!(session.is_action_pending());
        assert!(gate.controls().locked);

        assert_eq!(
            gate.submit(Some(&mut session), SkillId::HEAL),
            GateDecision::Rejected(GateRejection::ActionPending)
        );

        assert!(gate.release(&mut session));
        assert!(!session.is_action_pending());
        assert!(gate.submit(Some(&mut session), SkillId::HEAL).is_accepted());
    }

    #[test]
    fn release_is_idempotent() {
        let mut gate = InputGate::new();
        let mut session = session(false);
        gate.submit(Some(&mut session), SkillId::ATTACK);

        assert!(gate.release(&mut session));
        let controls = gate.controls().clone();
        assert!(!gate.release(&mut session));
        assert_eq!(gate.controls(), &controls);
        assert!(!session.is_action_pending());
    }

    #[test]
    fn cooldown_and_auto_mode_block_manual_input() {
        let mut gate = InputGate::new();
        gate.refresh_cooldowns(&Cooldowns::new().with(SkillId::ULTIMATE, 2));

        let mut manual = session(false);
        assert_eq!(
            gate.submit(Some(&mut manual), SkillId::ULTIMATE),
            GateDecision::Rejected(GateRejection::OnCooldown {
                skill: SkillId::ULTIMATE,
                remaining: 2
            })
        );
        assert!(!manual.is_action_pending());

        let mut auto = session(true);
        assert_eq!(
            gate.submit(Some(&mut auto), SkillId::ATTACK),
            GateDecision::Rejected(GateRejection::AutoMode)
        );
        assert!(gate.claim_for_auto(&mut auto));
        assert!(!gate.claim_for_auto(&mut auto));
    }

    #[test]
    fn finished_battle_rejects_everything() {
        let mut gate = InputGate::new();
        let mut session = session(true);
        session.record_round(7, true);

        assert_eq!(
            gate.submit(Some(&mut session), SkillId::ATTACK),
            GateDecision::Rejected(GateRejection::GameOver)
        );
        assert!(!gate.claim_for_auto(&mut session));
    }

    #[test]
    fn control_enablement_combines_flags() {
        let controls = ControlState {
            cooldowns: Cooldowns::new().with(SkillId::HEAL, 1),
            ..ControlState::default()
        };
        assert!(controls.is_enabled(SkillId::ATTACK));
        assert!(!controls.is_enabled(SkillId::HEAL));

        let locked = ControlState {
            locked: true,
            ..controls
        };
        assert!(!locked.is_enabled(SkillId::ATTACK));
    }
}
