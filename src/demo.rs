// Demo mode: generate a realistic mock feed to showcase the widgets
//
// The feed cycles through every frame type the realtime widgets consume:
// - `proof_generated` for iv-proof-ticker (twice per cycle, it's the busiest)
// - `balance_update` for iv-wallet-orb (random walk, never negative)
// - `utid_update` for iv-utid-badge (verification flips on after the first cycle)
//
// Frames are deterministic for a given seed so tests can assert on them.
//
// Run with: iv-widgets serve

use crate::config::DemoConfig;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::time::sleep;

/// UTID the demo badge is bound to
pub const DEMO_UTID: &str = "UTID-7F3A-91C2-0001";

const PROOF_TYPES: &[&str] = &["execution", "consensus", "storage", "identity"];
const PHYSICS_DOMAINS: &[&str] = &["quantum", "thermodynamic", "electromagnetic", "gravitational"];

/// Small xorshift generator, enough for plausible-looking numbers
#[derive(Debug, Clone)]
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in [0, 1)
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Frame generator for the demo feed
#[derive(Debug, Clone)]
pub struct DemoFeed {
    source: String,
    tick: u64,
    balance: f64,
    rng: Rng,
}

impl DemoFeed {
    pub fn new(source: impl Into<String>, seed: u64) -> Self {
        Self {
            source: source.into(),
            tick: 0,
            balance: 1250.0,
            // xorshift never leaves zero
            rng: Rng(seed.max(1)),
        }
    }

    /// Frames generated so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Next frame in the cycle: proof, proof, balance, utid
    pub fn next_frame(&mut self) -> Value {
        let frame = match self.tick % 4 {
            0 | 1 => self.proof(),
            2 => self.balance_update(),
            _ => self.utid_update(),
        };
        self.tick += 1;
        frame
    }

    fn proof(&mut self) -> Value {
        let proof_type = self.rng.pick(PROOF_TYPES);
        let value = (self.rng.next_f64() * 100.0 * 100.0).round() / 100.0;
        json!({
            "type": "proof_generated",
            "id": format!("proof-{:06}", self.tick),
            "proofType": proof_type,
            "value": value,
            "source": self.source,
        })
    }

    fn balance_update(&mut self) -> Value {
        // Drift between -5% and +5%
        let drift = (self.rng.next_f64() - 0.5) * 0.1;
        self.balance = ((self.balance * (1.0 + drift)) * 100.0).round() / 100.0;
        self.balance = self.balance.max(0.0);
        json!({
            "type": "balance_update",
            "balance": self.balance,
            "currency": "IVC",
        })
    }

    fn utid_update(&mut self) -> Value {
        let hash = format!("0x{:016x}{:016x}", self.rng.next_u64(), self.rng.next_u64());
        let level = (self.rng.next_f64() * 100.0).round();
        json!({
            "type": "utid_update",
            "utid": DEMO_UTID,
            "verified": self.tick >= 4,
            "blockchainHash": hash,
            "consciousnessLevel": level,
            "physicsDomain": self.rng.pick(PHYSICS_DOMAINS),
        })
    }
}

/// Broadcast demo frames until shutdown is signalled.
///
/// Frames sent while nobody is subscribed are dropped.
pub async fn run_demo(
    tx: broadcast::Sender<Value>,
    mut shutdown_rx: oneshot::Receiver<()>,
    config: DemoConfig,
) {
    let seed = chrono::Utc::now().timestamp_millis().unsigned_abs();
    let mut feed = DemoFeed::new(config.source, seed);
    let interval = Duration::from_millis(config.interval_ms);

    tracing::info!("Demo feed started ({}ms interval)", config.interval_ms);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = sleep(interval) => {
                let frame = feed.next_frame();
                let receivers = tx.send(frame).unwrap_or(0);
                tracing::trace!("Demo frame {} to {} subscribers", feed.tick(), receivers);
            }
        }
    }

    tracing::info!("Demo feed stopped after {} frames", feed.tick());
}
