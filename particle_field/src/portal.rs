//! Ephemeral "portal" tickets, one per detected oscillation.

/// How long a ticket stays alive.
pub const LIFETIME_MS: u64 = 2000;

/// One detected-gesture overlay event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortalTicket {
    pub id:         u64,
    pub created_ms: u64,
}

impl PortalTicket {
    pub fn expires_ms(&self) -> u64 { self.created_ms + LIFETIME_MS }

    pub fn is_alive(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_ms) < LIFETIME_MS
    }

    /// Fraction of the lifetime elapsed, `0.0..=1.0`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        let age = now_ms.saturating_sub(self.created_ms);
        (age as f32 / LIFETIME_MS as f32).min(1.0)
    }
}

/// Currently alive tickets.  Several may overlap.
#[derive(Debug, Default)]
pub struct PortalTickets {
    live:    Vec<PortalTicket>,
    next_id: u64,
}

impl PortalTickets {
    pub fn new() -> Self { Self::default() }

    pub fn open(&mut self, now_ms: u64) -> PortalTicket {
        let ticket = PortalTicket { id: self.next_id, created_ms: now_ms };
        self.next_id += 1;
        self.live.push(ticket);
        ticket
    }

    /// Drop every ticket whose lifetime has ended.
    pub fn prune(&mut self, now_ms: u64) {
        self.live.retain(|t| t.is_alive(now_ms));
    }

    /// Alive tickets, oldest first.
    pub fn live(&mut self, now_ms: u64) -> &[PortalTicket] {
        self.prune(now_ms);
        &self.live
    }

    /// Tickets held, expired ones included until the next prune.
    pub fn len(&self) -> usize { self.live.len() }

    pub fn is_empty(&self) -> bool { self.live.is_empty() }

    pub fn any_alive(&self, now_ms: u64) -> bool {
        self.live.iter().any(|t| t.is_alive(now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_at_exactly_two_seconds() {
        let mut tickets = PortalTickets::new();
        let t = tickets.open(1_000);
        assert_eq!(tickets.live(2_999), &[t]);
        assert!(tickets.live(3_000).is_empty());
        assert!(tickets.live(10_000).is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let mut tickets = PortalTickets::new();
        let a = tickets.open(0);
        let b = tickets.open(0);
        let c = tickets.open(5);
        assert!(a.id != b.id && b.id != c.id && a.id != c.id);
        assert_eq!(tickets.live(10).len(), 3);
    }

    #[test]
    fn overlapping_tickets_expire_independently() {
        let mut tickets = PortalTickets::new();
        tickets.open(0);
        let late = tickets.open(1_500);
        assert_eq!(tickets.live(2_000), &[late]);
        assert!(tickets.any_alive(3_499));
        assert!(!tickets.any_alive(3_500));
    }

    #[test]
    fn progress_ramps_and_saturates() {
        let t = PortalTicket { id: 0, created_ms: 100 };
        assert_eq!(t.progress(100), 0.0);
        assert_eq!(t.progress(1_100), 0.5);
        assert_eq!(t.progress(9_999), 1.0);
        assert_eq!(t.expires_ms(), 2_100);
    }
}
