//! Player currency with an animated display value
//!
//! The true balance changes instantly. The amount still "in flight" is kept
//! in `pending` and drained in whole units over `TRANSACTION_DURATION`, so the
//! displayed total (`balance + pending`) rolls toward the new value.

use serde::{Deserialize, Serialize};

use crate::consts::TRANSACTION_DURATION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// True balance
    pub balance: i32,
    /// Display offset still to be drained
    pub pending: i32,
    /// Remaining animation time; negative when idle
    pub timer: f32,
    /// Time carried over from ticks whose transfer rounded to zero
    pub carry: f32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            balance: 0,
            pending: 0,
            timer: -1.0,
            carry: 0.0,
        }
    }
}

impl Wallet {
    pub fn add(&mut self, amount: i32) {
        self.balance += amount;
        self.pending -= amount;
        self.restart();
    }

    pub fn remove(&mut self, amount: i32) {
        self.balance -= amount;
        self.pending += amount;
        self.restart();
    }

    fn restart(&mut self) {
        self.carry = 0.0;
        self.timer = TRANSACTION_DURATION;
    }

    /// Advance the display animation
    pub fn update(&mut self, dt: f32) {
        if self.timer < 0.0 {
            self.pending = 0;
            return;
        }

        let fraction = if self.timer > 0.0 {
            ((dt + self.carry) / self.timer).min(1.0)
        } else {
            1.0
        };
        let share = self.pending as f32 * fraction;
        let transfer = if self.pending > 0 {
            share.floor() as i32
        } else {
            share.ceil() as i32
        };

        if transfer != 0 {
            self.pending -= transfer;
            self.carry = 0.0;
        } else {
            self.carry += dt;
        }

        self.timer -= dt;
    }

    /// Value shown to the player
    pub fn displayed(&self) -> i32 {
        self.balance + self.pending
    }
}
