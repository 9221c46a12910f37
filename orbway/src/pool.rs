//! Stone pools: each player's hand and the shared resource reserve.

use crate::error::{Error, Result};
use crate::player::Player;
use crate::rotation::Rotation;
use crate::serial::{check_size, hex_str_to_byte, write_byte_as_hex, Serial};
use crate::setup::ACTION_POOL_SIZE;
use crate::stone::Stone;

// ── Action pool ─────────────────────────────────────────────────────

/// A player's hand of up to six stones.
///
/// The slots are kept ordered descending by stone kind with `Empty` acting as
/// a trailing sentinel, so equal hands always compare equal.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ActionPool {
    stones: [Stone; ACTION_POOL_SIZE],
}

impl ActionPool {
    pub const CAPACITY: usize = ACTION_POOL_SIZE;

    pub fn stones(&self) -> &[Stone; ACTION_POOL_SIZE] {
        &self.stones
    }

    pub fn at(&self, index: usize) -> Stone {
        self.stones[index]
    }

    pub fn has_stone(&self, stone: Stone) -> Result<bool> {
        if stone.is_empty() {
            return Err(Error::invariant("tried to check the pool for Empty"));
        }
        Ok(self.stones.contains(&stone))
    }

    /// Whether the pool holds both stones; a duplicated kind needs two copies.
    pub fn has_stones(&self, a: Stone, b: Stone) -> Result<bool> {
        if a.is_empty() || b.is_empty() {
            return Err(Error::invariant("tried to check the pool for Empty"));
        }
        if a == b {
            return Ok(self.stones.iter().filter(|s| **s == a).count() >= 2);
        }
        Ok(self.stones.contains(&a) && self.stones.contains(&b))
    }

    pub fn is_empty(&self) -> bool {
        self.stones[0].is_empty()
    }

    pub fn is_full(&self) -> bool {
        !self.stones[ACTION_POOL_SIZE - 1].is_empty()
    }

    pub fn stone_count(&self) -> usize {
        self.stones
            .iter()
            .position(|s: &Stone| s.is_empty())
            .unwrap_or(ACTION_POOL_SIZE)
    }

    pub fn free_slots(&self) -> usize {
        ACTION_POOL_SIZE - self.stone_count()
    }

    /// Insert a stone at its ordered slot, shifting lesser stones right.
    pub fn add(&mut self, stone: Stone) -> Result<()> {
        if self.is_full() {
            return Err(Error::rule("the action pool is full"));
        }
        if stone.is_empty() {
            return Err(Error::invariant("tried to add Empty to the action pool"));
        }
        let slot = self
            .stones
            .iter()
            .position(|s| *s < stone)
            .unwrap_or(ACTION_POOL_SIZE - 1);
        for i in (slot + 1..ACTION_POOL_SIZE).rev() {
            self.stones[i] = self.stones[i - 1];
        }
        self.stones[slot] = stone;
        Ok(())
    }

    /// Remove the first occurrence of a stone, shifting the tail left.
    pub fn take(&mut self, stone: Stone) -> Result<()> {
        let slot = self
            .stones
            .iter()
            .position(|s| *s == stone)
            .ok_or_else(|| Error::rule(format!("stone {stone} not found in the action pool")))?;
        for i in slot..ACTION_POOL_SIZE - 1 {
            self.stones[i] = self.stones[i + 1];
        }
        self.stones[ACTION_POOL_SIZE - 1] = Stone::Empty;
        Ok(())
    }

    /// The distinct stones of the pool, in pool order.
    pub fn unique_stones(&self) -> Vec<Stone> {
        let mut result: Vec<Stone> = Vec::with_capacity(ACTION_POOL_SIZE);
        for stone in self.stones {
            if stone.is_empty() {
                break;
            }
            if !result.contains(&stone) {
                result.push(stone);
            }
        }
        result
    }

    /// All distinct ordered pairs drawn from two different slots; a pair of
    /// equal kinds appears once and needs two copies in the pool.
    pub fn unique_stone_pairs(&self) -> Vec<(Stone, Stone)> {
        let count = self.stone_count();
        if count < 2 {
            return Vec::new();
        }
        let mut result = Vec::new();
        for i in 0..count {
            for j in 0..count {
                if i == j {
                    continue;
                }
                let pair = (self.stones[i], self.stones[j]);
                if !result.contains(&pair) {
                    result.push(pair);
                }
            }
        }
        result
    }

    /// All distinct ordered quadruples drawn from four different slots.
    pub fn unique_stone_quads(&self) -> Vec<(Stone, Stone, Stone, Stone)> {
        let count = self.stone_count();
        if count < 4 {
            return Vec::new();
        }
        let mut result = Vec::new();
        for a in 0..count {
            for b in 0..count {
                if b == a {
                    continue;
                }
                for c in 0..count {
                    if c == a || c == b {
                        continue;
                    }
                    for d in 0..count {
                        if d == a || d == b || d == c {
                            continue;
                        }
                        let quad = (
                            self.stones[a],
                            self.stones[b],
                            self.stones[c],
                            self.stones[d],
                        );
                        if !result.contains(&quad) {
                            result.push(quad);
                        }
                    }
                }
            }
        }
        result
    }
}

impl Serial for ActionPool {
    const DATA_SIZE: usize = ACTION_POOL_SIZE * Stone::DATA_SIZE;

    fn write_data(&self, data: &mut String) {
        for stone in &self.stones {
            stone.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<ActionPool> {
        check_size("ActionPool", data, Self::DATA_SIZE)?;
        let mut pool = ActionPool::default();
        for (i, stone) in pool.stones.iter_mut().enumerate() {
            *stone = Stone::from_data(&data[i..i + 1])?;
        }
        Ok(pool)
    }
}

// ── Per-player action pools ─────────────────────────────────────────

/// The four players' hands; index 0 is always the active player.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ActionPools {
    pools: [ActionPool; Player::COUNT as usize],
}

impl ActionPools {
    pub fn active(&self) -> &ActionPool {
        &self.pools[0]
    }

    pub fn active_mut(&mut self) -> &mut ActionPool {
        &mut self.pools[0]
    }

    pub fn get(&self, player: Player) -> &ActionPool {
        &self.pools[player.index()]
    }

    pub fn get_mut(&mut self, player: Player) -> &mut ActionPool {
        &mut self.pools[player.index()]
    }

    /// Shift the pools left so index 0 follows the board rotation.
    pub fn rotated(&self, rotation: Rotation) -> ActionPools {
        let mut result = ActionPools::default();
        for (i, pool) in result.pools.iter_mut().enumerate() {
            *pool = self.pools[(i + rotation.value() as usize) % Player::COUNT as usize];
        }
        result
    }
}

impl Serial for ActionPools {
    const DATA_SIZE: usize = ActionPool::DATA_SIZE * Player::COUNT as usize;

    fn write_data(&self, data: &mut String) {
        for pool in &self.pools {
            pool.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<ActionPools> {
        check_size("ActionPools", data, Self::DATA_SIZE)?;
        let mut pools = ActionPools::default();
        for (i, pool) in pools.pools.iter_mut().enumerate() {
            let offset = i * ActionPool::DATA_SIZE;
            *pool = ActionPool::from_data(&data[offset..offset + ActionPool::DATA_SIZE])?;
        }
        Ok(pools)
    }
}

// ── Resource pool ───────────────────────────────────────────────────

/// The shared reserve of stones, held as per-kind counts.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ResourcePool {
    counts: [u8; Stone::COUNT - 1],
}

impl ResourcePool {
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    pub fn has_stone(&self, stone: Stone) -> bool {
        self.count(stone) > 0
    }

    pub fn count(&self, stone: Stone) -> u8 {
        debug_assert!(!stone.is_empty());
        self.counts[stone.value() as usize - 1]
    }

    pub fn add(&mut self, stone: Stone, count: u8) {
        self.counts[stone.value() as usize - 1] += count;
    }

    pub fn take(&mut self, stone: Stone, count: u8) -> Result<()> {
        let current = self.count(stone);
        if count > current {
            return Err(Error::rule(format!(
                "cannot take {count}×{stone} from the resource pool ({current} left)"
            )));
        }
        self.counts[stone.value() as usize - 1] = current - count;
        Ok(())
    }

    /// All stones available for a single extra draw action.
    pub fn all_action_one_extra_draw(&self) -> Vec<Stone> {
        Stone::all_non_empty()
            .into_iter()
            .filter(|stone| self.has_stone(*stone))
            .collect()
    }

    /// All unordered pairs for a double extra draw; a duplicated kind needs
    /// at least two copies in the pool.
    pub fn all_action_two_extra_draws(&self) -> Vec<(Stone, Stone)> {
        let mut result = Vec::new();
        for a in Stone::all_non_empty() {
            for b in Stone::all_non_empty() {
                if a == b {
                    if self.count(a) >= 2 {
                        result.push((a, b));
                    }
                } else if a < b && self.has_stone(a) && self.has_stone(b) {
                    result.push((a, b));
                }
            }
        }
        result
    }

    /// All stones available for the regular end-of-move draw.
    pub fn all_regular_draws(&self) -> Vec<Stone> {
        if self.is_empty() {
            return Vec::new();
        }
        self.all_action_one_extra_draw()
    }

    /// Total number of stones in the reserve.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|count| *count as usize).sum()
    }
}

impl Serial for ResourcePool {
    const DATA_SIZE: usize = (Stone::COUNT - 1) * 2;

    fn write_data(&self, data: &mut String) {
        for count in &self.counts {
            write_byte_as_hex(data, *count);
        }
    }

    fn from_data(data: &str) -> Result<ResourcePool> {
        check_size("ResourcePool", data, Self::DATA_SIZE)?;
        let mut pool = ResourcePool::default();
        for (i, count) in pool.counts.iter_mut().enumerate() {
            *count = hex_str_to_byte(&data[i * 2..i * 2 + 2]);
        }
        Ok(pool)
    }
}
