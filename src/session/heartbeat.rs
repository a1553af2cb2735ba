/// Computes the advisory outbound/inbound heart-beat intervals, in
/// milliseconds, per the negotiation formula: `max(cx, sy)` if both
/// non-zero else `0`, and symmetrically for the inbound side. `0` means "no
/// heart-beat on this side"; the caller is responsible for running any
/// timer against these values.
pub fn negotiate_intervals(client: (u32, u32), server: (u32, u32)) -> (u64, u64) {
    let (cx, cy) = client;
    let (sx, sy) = server;
    let outbound = if cx != 0 && sy != 0 { cx.max(sy) as u64 } else { 0 };
    let inbound = if cy != 0 && sx != 0 { cy.max(sx) as u64 } else { 0 };
    (outbound, inbound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_max_of_both_sides_when_both_nonzero() {
        assert_eq!(negotiate_intervals((10, 20), (5, 30)), (30, 20));
    }

    #[test]
    fn zero_on_either_side_disables_that_direction() {
        assert_eq!(negotiate_intervals((0, 20), (5, 30)), (0, 20));
        assert_eq!(negotiate_intervals((10, 20), (5, 0)), (10, 0));
    }

    #[test]
    fn both_zero_stays_disabled() {
        assert_eq!(negotiate_intervals((0, 0), (0, 0)), (0, 0));
    }
}
