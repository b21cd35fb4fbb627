//! Creature List and Tick Phases
//!
//! Owns every creature plus the claim layer: a 1024-cell occupancy map that
//! is `true` exactly where a live non-Chip creature stands (creatures resting
//! on a clone machine excepted). Every position change goes through this
//! module so the two views can never disagree.
//!
//! ## Phases
//!
//! Each level tick drives [`CreatureList::tick`] three times:
//!
//! 1. **Select**: choose forced or voluntary moves, reverse index order
//! 2. **Move**: execute them, reverse index order
//! 3. **Teleport**: resolve creatures standing on teleports
//!
//! Reverse order is a tie-break: higher indices win contested cells.

use smallvec::{smallvec, SmallVec};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::direction::Direction;
use crate::core::position::{Position, GRID_CELLS};
use crate::game::board::{Board, BOOT_FIRE, BOOT_ICE, BOOT_SLIDE, BOOT_WATER};
use crate::game::button::press_button;
use crate::game::creature::{Creature, TILE_DISTANCE};
use crate::game::creature_id::CreatureId;
use crate::game::tile::Tile;

/// Index of Chip in the list.
pub const CHIP_INDEX: usize = 0;

/// Blob choices indexed by `random4()`.
const BLOB_DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

/// Claim layer type.
pub type ClaimLayer = Box<[bool; GRID_CELLS]>;

/// Options for a move legality check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags {
    /// Remove a finished death animation in the way (monsters).
    pub clear_animations: bool,
    /// Aim a block Chip walks into.
    pub push_blocks: bool,
    /// Aim and immediately move a block Chip walks into.
    pub push_now: bool,
    /// The mover is being sprung from a trap.
    pub releasing: bool,
}

impl MoveFlags {
    /// Pure probe with no side effects beyond exposing hidden walls.
    pub const NONE: MoveFlags = MoveFlags {
        clear_animations: false,
        push_blocks: false,
        push_now: false,
        releasing: false,
    };

    /// Chip choosing between candidates.
    pub const CHIP_SELECT: MoveFlags = MoveFlags { push_blocks: true, ..MoveFlags::NONE };

    /// Chip starting a move.
    pub const CHIP_MOVE: MoveFlags = MoveFlags { push_blocks: true, push_now: true, ..MoveFlags::NONE };

    /// A monster or block starting a move.
    pub const MONSTER_MOVE: MoveFlags = MoveFlags { clear_animations: true, ..MoveFlags::NONE };

    fn releasing(self, releasing: bool) -> Self {
        Self { releasing, ..self }
    }
}

/// Which of the three per-tick passes runs next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Choose moves.
    #[default]
    Select,
    /// Execute moves.
    Move,
    /// Resolve teleports.
    Teleport,
}

/// All creatures of a level, Chip first.
#[derive(Clone, Debug)]
pub struct CreatureList {
    creatures: Vec<Creature>,
    claimed: ClaimLayer,
    phase: Phase,
    teeth_step: bool,
    /// Creatures at or past this index were cloned this tick and sit out
    /// the remaining phases.
    settled_len: usize,
}

/// Claim layer implied by a creature list on a given tile layer.
pub fn compute_claims(creatures: &[Creature], layer: &[Tile; GRID_CELLS]) -> ClaimLayer {
    let mut claimed = Box::new([false; GRID_CELLS]);
    for creature in creatures.iter().skip(1) {
        if creature.is_alive() && layer[creature.position.index()] != Tile::CloneMachine {
            claimed[creature.position.index()] = true;
        }
    }
    claimed
}

impl CreatureList {
    /// Build from a list whose first entry is Chip.
    pub fn new(creatures: Vec<Creature>, board: &Board) -> Self {
        let claimed = compute_claims(&creatures, board.layer());
        let settled_len = creatures.len();
        Self {
            creatures,
            claimed,
            phase: Phase::Select,
            teeth_step: false,
            settled_len,
        }
    }

    /// Number of creatures, Chip included.
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    /// Never true for a constructed list (Chip is always present).
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Creature by index.
    pub fn get(&self, index: usize) -> Option<&Creature> {
        self.creatures.get(index)
    }

    /// Mutable creature by index. Callers must keep the claim layer valid.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Creature> {
        self.creatures.get_mut(index)
    }

    /// All creatures in index order.
    pub fn as_slice(&self) -> &[Creature] {
        &self.creatures
    }

    /// Chip.
    pub fn chip(&self) -> &Creature {
        &self.creatures[CHIP_INDEX]
    }

    /// Whether a live non-Chip creature occupies `position`.
    #[inline]
    pub fn is_claimed(&self, position: Position) -> bool {
        self.claimed[position.index()]
    }

    /// The claim layer.
    pub fn claims(&self) -> &[bool; GRID_CELLS] {
        &self.claimed
    }

    /// Phase the next [`CreatureList::tick`] call will run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether Teeth may move this tick.
    pub fn teeth_step(&self) -> bool {
        self.teeth_step
    }

    /// First live non-Chip creature at `position`.
    pub fn creature_at(&self, position: Position) -> Option<usize> {
        (1..self.creatures.len()).find(|&i| {
            let c = &self.creatures[i];
            c.is_alive() && c.position == position
        })
    }

    /// First death animation still playing at `position`.
    pub fn animation_at(&self, position: Position) -> Option<usize> {
        (0..self.creatures.len()).find(|&i| {
            let c = &self.creatures[i];
            c.is_animation() && c.position == position
        })
    }

    // =========================================================================
    // TICK ORCHESTRATION
    // =========================================================================

    /// Prepare for a new level tick.
    pub fn initialise(&mut self, board: &Board) {
        self.teeth_step = board.step.is_teeth_step(board.tick);
        self.settled_len = self.creatures.len();
    }

    /// Admit this tick's clones to future phases.
    pub fn finalise(&mut self) {
        self.settled_len = self.creatures.len();
    }

    /// Run the current phase and advance to the next.
    pub fn tick(&mut self, board: &mut Board) {
        #[cfg(feature = "debug-tracing")]
        trace!(tick = board.tick, phase = ?self.phase, creatures = self.creatures.len(), "creature phase");

        self.phase = match self.phase {
            Phase::Select => {
                self.select_moves(board);
                Phase::Move
            }
            Phase::Move => {
                self.move_creatures(board);
                Phase::Teleport
            }
            Phase::Teleport => {
                self.teleport_creatures(board);
                Phase::Select
            }
        };
    }

    fn select_moves(&mut self, board: &mut Board) {
        let chip_position = self.creatures[CHIP_INDEX].position;

        for i in (1..self.settled_len).rev() {
            let creature = &mut self.creatures[i];
            creature.t_direction = Direction::None;
            creature.f_direction = Direction::None;

            if !creature.is_alive() {
                if creature.animation_timer != 0 {
                    creature.animation_timer -= 1;
                }
                continue;
            }
            if creature.time_traveled != 0 {
                continue;
            }
            // Trapped creatures still select: they turn and draw, but every
            // candidate is refused until the trap is sprung
            if board.tile(creature.position) == Tile::CloneMachine {
                continue;
            }
            if creature.kind == CreatureId::Teeth && !self.teeth_step {
                continue;
            }

            if self.forced_move(i, board) {
                continue;
            }

            let creature = &mut self.creatures[i];
            let candidates: SmallVec<[Direction; 4]> = match creature.next_move_cheat.take() {
                Some(direction) => {
                    // The injected move still consumes the draw it replaces
                    match creature.kind {
                        CreatureId::Blob => {
                            board.rng.random4();
                        }
                        CreatureId::Walker => {
                            board.rng.pseudo_random4();
                        }
                        _ => {}
                    }
                    smallvec![direction]
                }
                None => creature.direction_priority(chip_position),
            };
            self.choose_direction(i, &candidates, board);
        }
    }

    fn move_creatures(&mut self, board: &mut Board) {
        for i in (1..self.settled_len).rev() {
            let creature = &self.creatures[i];
            if !creature.is_alive() || board.tile(creature.position) == Tile::CloneMachine {
                continue;
            }
            if creature.kind == CreatureId::Teeth && !self.teeth_step && creature.time_traveled == 0 {
                continue;
            }
            self.tick_creature(i, board, false);
        }
    }

    fn teleport_creatures(&mut self, board: &mut Board) {
        for i in (0..self.settled_len).rev() {
            let creature = &self.creatures[i];
            if board.tile(creature.position) != Tile::Teleport
                || !creature.is_alive()
                || creature.time_traveled != 0
                || creature.animation_timer != 0
                || creature.teleport_flag
            {
                continue;
            }
            self.teleport(i, board);
        }
    }

    // =========================================================================
    // CHIP
    // =========================================================================

    /// Choose Chip's move for this tick from player input.
    ///
    /// Terrain-forced moves ignore input. A diagonal keeps Chip's current
    /// axis when that component is legal and otherwise tries the other one.
    pub fn select_chip_move(&mut self, input: Direction, board: &mut Board) {
        let chip = &mut self.creatures[CHIP_INDEX];
        chip.t_direction = Direction::None;
        chip.f_direction = Direction::None;
        if !chip.is_alive() || chip.animation_timer != 0 || chip.time_traveled != 0 {
            return;
        }
        if self.forced_move(CHIP_INDEX, board) {
            return;
        }

        let facing = self.creatures[CHIP_INDEX].direction;
        let chosen = if input.is_diagonal() {
            let parts = input.decompose();
            let (vertical, horizontal) = (parts[0], parts[1]);
            let (first, second) = if facing == horizontal {
                (horizontal, vertical)
            } else {
                (vertical, horizontal)
            };
            if self.can_make_move(CHIP_INDEX, first, board, MoveFlags::CHIP_SELECT) {
                first
            } else if self.can_make_move(CHIP_INDEX, second, board, MoveFlags::CHIP_SELECT) {
                second
            } else {
                first
            }
        } else if input.is_cardinal() {
            // Checked for its side effects (block aiming, exposed walls)
            self.can_make_move(CHIP_INDEX, input, board, MoveFlags::CHIP_SELECT);
            input
        } else {
            return;
        };
        self.creatures[CHIP_INDEX].t_direction = chosen;
    }

    /// Execute Chip's queued move. Returns whether Chip started a new move.
    pub fn move_chip(&mut self, board: &mut Board) -> bool {
        let chip = &self.creatures[CHIP_INDEX];
        let was_idle = chip.is_alive() && chip.time_traveled == 0 && chip.animation_timer == 0;
        let before = chip.position;
        self.tick_creature(CHIP_INDEX, board, false);
        was_idle && self.creatures[CHIP_INDEX].position != before
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Apply terrain forcing. Sets `f_direction` and returns whether the
    /// forced move replaces voluntary selection.
    fn forced_move(&mut self, i: usize, board: &mut Board) -> bool {
        let creature = &mut self.creatures[i];
        creature.f_direction = Direction::None;
        let tile = board.tile(creature.position);
        let is_chip = creature.is_chip();

        if tile.is_ice() {
            if creature.direction == Direction::None || (is_chip && board.inventory.has_boot(BOOT_ICE)) {
                return false;
            }
            creature.f_direction = board.slide_direction(creature.direction, tile, true);
            true
        } else if tile.is_force_floor() {
            if is_chip && board.inventory.has_boot(BOOT_SLIDE) {
                return false;
            }
            creature.f_direction = board.slide_direction(creature.direction, tile, true);
            !creature.override_token
        } else if tile == Tile::Teleport {
            creature.f_direction = creature.direction;
            true
        } else {
            false
        }
    }

    /// Pick the first legal candidate as `t_direction`.
    ///
    /// If none is legal the creature turns to face the last one tried.
    fn choose_direction(&mut self, i: usize, candidates: &[Direction], board: &mut Board) {
        let mut last = Direction::None;
        for &candidate in candidates {
            let facing = self.creatures[i].direction;
            let direction = match candidate {
                Direction::WalkerTurn => {
                    let turns = board.rng.pseudo_random4();
                    (0..turns).fold(facing, |d, _| d.right())
                }
                Direction::BlobTurn => BLOB_DIRECTIONS[board.rng.random4() as usize],
                other => other,
            };
            last = direction;
            if direction != Direction::None && self.can_make_move(i, direction, board, MoveFlags::NONE) {
                self.creatures[i].t_direction = direction;
                return;
            }
        }
        if last != Direction::None {
            self.creatures[i].direction = last;
        }
    }

    // =========================================================================
    // MOVEMENT
    // =========================================================================

    /// Whether creature `i` may step `direction` right now.
    ///
    /// Depending on `flags` this has side effects even when it fails: Chip
    /// exposes hidden walls and aims or shoves blocks, monsters clear death
    /// animations.
    pub fn can_make_move(&mut self, i: usize, direction: Direction, board: &mut Board, flags: MoveFlags) -> bool {
        let creature = &self.creatures[i];
        if creature.time_traveled != 0 {
            return false;
        }
        let Some(to) = creature.position.step(direction) else {
            return false;
        };
        if !creature.can_leave(direction, board.tile(creature.position), flags.releasing, board) {
            return false;
        }
        let tile = board.tile(to);
        if !creature.can_enter(direction, tile, board) {
            return false;
        }

        if creature.is_chip() {
            if self.animation_at(to).is_some() {
                return false;
            }
            let block = self
                .creature_at(to)
                .filter(|&b| self.creatures[b].kind == CreatureId::Block);
            if let Some(b) = block {
                let aiming = flags.push_blocks || flags.push_now;
                let probe = MoveFlags { clear_animations: true, ..MoveFlags::NONE };
                if !self.can_make_move(b, direction, board, probe) {
                    if aiming && self.creatures[b].time_traveled == 0 {
                        self.creatures[b].direction = direction;
                    }
                    return false;
                }
                if aiming {
                    let block = &mut self.creatures[b];
                    block.direction = direction;
                    block.t_direction = direction;
                    if flags.push_now {
                        self.tick_creature(b, board, false);
                    }
                }
            }
            if matches!(tile, Tile::HiddenWallTemp | Tile::BlueWallReal) {
                board.set_tile(to, Tile::Wall);
                return false;
            }
        } else {
            if self.claimed[to.index()] {
                return false;
            }
            if flags.clear_animations {
                if let Some(anim) = self.animation_at(to) {
                    self.kill(anim, board);
                }
            }
        }
        true
    }

    /// Advance creature `i` by one tick.
    ///
    /// Starts a move when the creature is idle, moves it along by its
    /// speed, and applies the arrival effects of the destination tile once
    /// it gets there. Returns whether the creature is in motion.
    pub fn tick_creature(&mut self, i: usize, board: &mut Board, releasing: bool) -> bool {
        let creature = &mut self.creatures[i];
        if creature.animation_timer != 0 {
            creature.animation_timer -= 1;
            return false;
        }
        if creature.time_traveled == 0 && !self.start_move(i, board, releasing) {
            return false;
        }

        let creature = &mut self.creatures[i];
        let tile = board.tile(creature.position);
        let speed = creature.speed(tile, board);
        creature.time_traveled = creature.time_traveled.saturating_sub(speed);
        if creature.time_traveled > 0 {
            return true;
        }
        self.arrive(i, board);
        true
    }

    /// Begin a one-tile move. Returns `false` when nothing moved or the
    /// move ended in a collision.
    fn start_move(&mut self, i: usize, board: &mut Board, releasing: bool) -> bool {
        let creature = &mut self.creatures[i];
        if !creature.is_alive() {
            return false;
        }
        creature.sliding = false;
        if releasing {
            creature.t_direction = creature.direction;
        }
        let direction = if creature.t_direction != Direction::None {
            creature.t_direction
        } else if creature.f_direction != Direction::None {
            creature.sliding = true;
            creature.f_direction
        } else {
            return false;
        };
        creature.direction = direction;

        let from = creature.position;
        let from_tile = board.tile(from);
        let is_chip = creature.is_chip();
        let inventory = &board.inventory;
        if is_chip && !inventory.has_boot(BOOT_SLIDE) {
            if from_tile.is_force_floor() && creature.t_direction == Direction::None {
                creature.override_token = true;
            } else if !from_tile.is_ice() || inventory.has_boot(BOOT_ICE) {
                creature.override_token = false;
            }
        }

        let flags = if is_chip { MoveFlags::CHIP_MOVE } else { MoveFlags::MONSTER_MOVE }.releasing(releasing);
        if !self.can_make_move(i, direction, board, flags) {
            let skates = is_chip && board.inventory.has_boot(BOOT_ICE);
            if from_tile.is_ice() && !skates {
                let bounced = board.slide_direction(direction.reverse(), from_tile, false);
                self.creatures[i].direction = bounced;
            }
            return false;
        }
        let Some(to) = from.step(direction) else {
            return false;
        };

        if i != CHIP_INDEX {
            self.claimed[from.index()] = false;
            self.claimed[to.index()] = true;
        }
        let creature = &mut self.creatures[i];
        creature.position = to;
        creature.time_traveled = TILE_DISTANCE;
        creature.teleport_flag = false;
        let kind = creature.kind;

        if i != CHIP_INDEX {
            let chip = &self.creatures[CHIP_INDEX];
            if chip.is_alive() && chip.position == to {
                self.kill(CHIP_INDEX, board);
                if kind != CreatureId::Block {
                    self.kill(i, board);
                }
                return false;
            }
        } else if self.claimed[to.index()] {
            let other = self.creature_at(to);
            self.kill(CHIP_INDEX, board);
            if let Some(j) = other.filter(|&j| self.creatures[j].kind != CreatureId::Block) {
                self.kill(j, board);
            }
            return false;
        }
        true
    }

    /// Tile-entry effects, applied once per arrival.
    fn arrive(&mut self, i: usize, board: &mut Board) {
        let creature = &self.creatures[i];
        let position = creature.position;
        let kind = creature.kind;
        let is_chip = creature.is_chip();
        let tile = board.tile(position);

        match tile {
            Tile::Water => {
                if kind == CreatureId::Block {
                    board.set_tile(position, Tile::Dirt);
                }
                if kind != CreatureId::Glider && !(is_chip && board.inventory.has_boot(BOOT_WATER)) {
                    self.kill(i, board);
                }
            }
            Tile::IceSlideSouthEast | Tile::IceSlideSouthWest | Tile::IceSlideNorthWest | Tile::IceSlideNorthEast => {
                if !(is_chip && board.inventory.has_boot(BOOT_ICE)) {
                    let facing = self.creatures[i].direction;
                    self.creatures[i].direction = board.slide_direction(facing, tile, false);
                }
            }
            Tile::ButtonGreen | Tile::ButtonRed | Tile::ButtonBrown | Tile::ButtonBlue => {
                press_button(self, board, position);
            }
            Tile::Fire => {
                if is_chip && !board.inventory.has_boot(BOOT_FIRE) {
                    self.kill(i, board);
                }
            }
            Tile::Bomb => {
                self.kill(i, board);
                board.set_tile(position, Tile::Floor);
            }
            Tile::PopUpWall => board.set_tile(position, Tile::Wall),
            Tile::BlueWallFake | Tile::Socket | Tile::Dirt => board.set_tile(position, Tile::Floor),
            Tile::Chip => {
                if is_chip {
                    if board.inventory.chips_left > 0 {
                        board.inventory.chips_left -= 1;
                    }
                    board.set_tile(position, Tile::Floor);
                }
            }
            Tile::KeyBlue | Tile::KeyRed | Tile::KeyGreen | Tile::KeyYellow => {
                // Monsters destroy blue keys without collecting them
                if !is_chip && tile != Tile::KeyBlue {
                    return;
                }
                if let Some(slot) = tile.key_slot().filter(|_| is_chip) {
                    board.inventory.keys[slot] = board.inventory.keys[slot].saturating_add(1);
                }
                board.set_tile(position, Tile::Floor);
            }
            Tile::DoorBlue | Tile::DoorRed | Tile::DoorYellow => {
                if let Some(slot) = tile.key_slot() {
                    board.inventory.keys[slot] = board.inventory.keys[slot].saturating_sub(1);
                }
                board.set_tile(position, Tile::Floor);
            }
            Tile::DoorGreen => board.set_tile(position, Tile::Floor),
            Tile::BootsWater | Tile::BootsFire | Tile::BootsIce | Tile::BootsSlide => {
                if let Some(slot) = tile.boot_slot().filter(|_| is_chip) {
                    board.inventory.boots[slot] = 1;
                    board.set_tile(position, Tile::Floor);
                }
            }
            Tile::Exit => {
                if is_chip {
                    self.creatures[i].animation_timer = 1;
                }
            }
            Tile::Thief => {
                if is_chip {
                    board.inventory.boots = [0; 4];
                }
            }
            _ => {}
        }
    }

    /// Kill creature `i`.
    ///
    /// Killing a live creature releases its claim and starts the death
    /// animation. Killing a dead one cancels its animation.
    pub fn kill(&mut self, i: usize, board: &Board) {
        let creature = &mut self.creatures[i];
        if !creature.is_alive() {
            creature.animation_timer = 0;
            return;
        }
        if i != CHIP_INDEX && board.tile(creature.position) != Tile::CloneMachine {
            self.claimed[creature.position.index()] = false;
        }
        creature.kind = CreatureId::Dead;
        creature.animation_timer = board.death_timer();
        creature.time_traveled = 0;
        creature.direction = match board.tile(creature.position) {
            Tile::Water | Tile::Dirt => Direction::Up,
            Tile::Fire | Tile::Bomb => Direction::Left,
            _ => Direction::Down,
        };
    }

    // =========================================================================
    // TELEPORTS, CLONES, TRAPS, TANKS
    // =========================================================================

    /// Send creature `i` to the previous teleport in the list with a usable
    /// exit, cycling back to its own if none is.
    fn teleport(&mut self, i: usize, board: &mut Board) {
        let origin = self.creatures[i].position;
        let Some(start) = board.teleports.iter().position(|&p| p == origin) else {
            return;
        };
        let count = board.teleports.len();
        let is_chip = i == CHIP_INDEX;

        if !is_chip {
            self.claimed[origin.index()] = false;
        }
        let mut slot = start;
        let destination = loop {
            slot = (slot + count - 1) % count;
            let candidate = board.teleports[slot];
            if self.teleport_exit_open(i, candidate, board) {
                break Some(candidate);
            }
            if slot == start {
                break None;
            }
        };

        self.creatures[i].teleport_flag = true;
        match destination {
            Some(target) => {
                self.creatures[i].position = target;
                if !is_chip {
                    self.claimed[target.index()] = true;
                    let chip = &self.creatures[CHIP_INDEX];
                    if chip.is_alive() && chip.position == target {
                        self.kill(CHIP_INDEX, board);
                        self.kill(i, board);
                    }
                }
            }
            None if is_chip => self.kill(CHIP_INDEX, board),
            None => self.claimed[origin.index()] = true,
        }
    }

    fn teleport_exit_open(&self, i: usize, candidate: Position, board: &Board) -> bool {
        if self.claimed[candidate.index()] {
            return false;
        }
        let creature = &self.creatures[i];
        let direction = creature.direction;
        let Some(exit) = candidate.step(direction) else {
            return false;
        };
        if !creature.can_enter(direction, board.tile(exit), board) {
            return false;
        }
        creature.is_chip() || !self.claimed[exit.index()]
    }

    /// Clone whatever rests on the clone machine at `machine`.
    ///
    /// The clone reuses the first expired slot after Chip or is appended,
    /// then immediately starts moving out in the template's facing. Returns
    /// `false` when there is no template or its exit is blocked.
    pub fn clone_from(&mut self, machine: Position, board: &mut Board) -> bool {
        if board.tile(machine) != Tile::CloneMachine {
            return false;
        }
        let Some(template) = (1..self.creatures.len())
            .rev()
            .find(|&j| self.creatures[j].is_alive() && self.creatures[j].position == machine)
        else {
            return false;
        };
        let direction = self.creatures[template].direction;
        if !self.can_make_move(template, direction, board, MoveFlags::NONE) {
            return false;
        }

        let mut clone = Creature::new(machine, self.creatures[template].kind, direction);
        clone.t_direction = direction;

        let slot = match (1..self.creatures.len()).find(|&j| self.creatures[j].is_expired()) {
            Some(j) => {
                self.creatures[j] = clone;
                j
            }
            None => {
                self.creatures.push(clone);
                self.creatures.len() - 1
            }
        };
        self.tick_creature(slot, board, false);
        true
    }

    /// Release the creature sitting in the trap at `trap`.
    pub fn spring_trap(&mut self, trap: Position, board: &mut Board) {
        if board.tile(trap) != Tile::Trap {
            return;
        }
        let trapped = (0..self.creatures.len()).find(|&j| {
            let c = &self.creatures[j];
            c.is_alive() && c.position == trap && c.time_traveled == 0
        });
        if let Some(j) = trapped {
            self.tick_creature(j, board, true);
        }
    }

    /// Turn every live tank around.
    pub fn turn_tanks(&mut self) {
        for creature in self.creatures.iter_mut().filter(|c| c.kind.is_tank()) {
            creature.direction = creature.direction.reverse();
            creature.t_direction = creature.t_direction.reverse();
        }
    }

    /// Replace the whole list, recomputing claims.
    pub(crate) fn replace(&mut self, creatures: Vec<Creature>, board: &Board) {
        *self = Self::new(creatures, board);
    }

    /// Rebuild the claim layer after an edit outside the tick.
    pub(crate) fn refresh_claims(&mut self, board: &Board) {
        self.claimed = compute_claims(&self.creatures, board.layer());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LynxRng;
    use crate::game::button::Button;
    use crate::game::step::Step;

    fn at(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    fn board() -> Board {
        Board::new(Box::new([Tile::Floor; GRID_CELLS]), LynxRng::new(1, 0x12, 0x34), Direction::Up, Step::Even)
    }

    fn setup(creatures: Vec<Creature>, board: &Board) -> CreatureList {
        CreatureList::new(creatures, board)
    }

    fn chip_at(x: i32, y: i32) -> Creature {
        Creature::new(at(x, y), CreatureId::Chip, Direction::Down)
    }

    /// Run the three phases of a level tick with a given Chip input.
    fn full_tick(list: &mut CreatureList, board: &mut Board, input: Direction) {
        board.tick += 1;
        list.initialise(board);
        list.tick(board);
        list.select_chip_move(input, board);
        list.tick(board);
        list.move_chip(board);
        list.tick(board);
        list.finalise();
    }

    fn assert_claims_consistent(list: &CreatureList, board: &Board) {
        let expected = compute_claims(list.as_slice(), board.layer());
        assert_eq!(&expected[..], &list.claims()[..]);
    }

    #[test]
    fn test_claims_exclude_chip_dead_and_clone_machines() {
        let mut b = board();
        b.set_tile(at(5, 5), Tile::CloneMachine);
        let mut dead = Creature::new(at(3, 3), CreatureId::Bug, Direction::Up);
        dead.kind = CreatureId::Dead;
        let list = setup(
            vec![
                chip_at(0, 0),
                Creature::new(at(1, 1), CreatureId::Bug, Direction::Up),
                dead,
                Creature::new(at(5, 5), CreatureId::Glider, Direction::Up),
            ],
            &b,
        );
        assert!(!list.is_claimed(at(0, 0)));
        assert!(list.is_claimed(at(1, 1)));
        assert!(!list.is_claimed(at(3, 3)));
        assert!(!list.is_claimed(at(5, 5)));
    }

    #[test]
    fn test_time_traveled_cycle_and_single_arrival() {
        let mut b = board();
        b.set_tile(at(10, 11), Tile::KeyBlue);
        let mut list = setup(
            vec![chip_at(0, 0), Creature::new(at(10, 10), CreatureId::Tank, Direction::Down)],
            &b,
        );

        let mut seen = Vec::new();
        for _ in 0..4 {
            full_tick(&mut list, &mut b, Direction::None);
            seen.push(list.get(1).unwrap().time_traveled);
        }
        assert_eq!(seen, vec![6, 4, 2, 0]);
        assert_eq!(list.get(1).unwrap().position, at(10, 11));
        // A tank destroys the blue key exactly once, without collecting it
        assert_eq!(b.tile(at(10, 11)), Tile::Floor);
        assert_eq!(b.inventory.keys, [0; 4]);
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_blob_moves_at_half_speed() {
        let mut b = board();
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(10, 10), CreatureId::Blob, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.get(1).unwrap().time_traveled, 7);
        for _ in 0..7 {
            full_tick(&mut list, &mut b, Direction::None);
        }
        assert_eq!(list.get(1).unwrap().time_traveled, 0);
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_bug_follows_left_wall() {
        let mut b = board();
        // Wall to the bug's left, open ahead
        b.set_tile(at(9, 10), Tile::Wall);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(10, 10), CreatureId::Bug, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::None);
        let bug = list.get(1).unwrap();
        assert_eq!(bug.direction, Direction::Up);
        assert_eq!(bug.position, at(10, 9));
    }

    #[test]
    fn test_boxed_ball_faces_last_candidate() {
        let mut b = board();
        b.set_tile(at(10, 9), Tile::Wall);
        b.set_tile(at(10, 11), Tile::Wall);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(10, 10), CreatureId::Ball, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::None);
        let ball = list.get(1).unwrap();
        assert_eq!(ball.position, at(10, 10));
        assert_eq!(ball.direction, Direction::Down);
    }

    #[test]
    fn test_monster_moving_onto_chip_kills_both() {
        let mut b = board();
        let mut list = setup(vec![chip_at(10, 9), Creature::new(at(10, 10), CreatureId::Tank, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::None);
        assert!(!list.chip().is_alive());
        assert!(!list.get(1).unwrap().is_alive());
        assert!(!list.is_claimed(at(10, 9)));
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_chip_moving_onto_monster_kills_both() {
        let mut b = board();
        // The tank faces a wall so it stays put
        b.set_tile(at(10, 11), Tile::Wall);
        let mut list = setup(vec![chip_at(10, 9), Creature::new(at(10, 10), CreatureId::Tank, Direction::Down)], &b);

        full_tick(&mut list, &mut b, Direction::Down);
        assert!(!list.chip().is_alive());
        assert!(!list.get(1).unwrap().is_alive());
        assert_eq!(list.chip().position, at(10, 10));
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_death_animation_counts_down() {
        let mut b = board();
        b.set_tile(at(10, 9), Tile::Bomb);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(10, 10), CreatureId::Tank, Direction::Up)], &b);

        for _ in 0..4 {
            full_tick(&mut list, &mut b, Direction::None);
        }
        let tank = list.get(1).unwrap();
        assert_eq!(tank.kind, CreatureId::Dead);
        assert_eq!(tank.direction, Direction::Left);
        assert_eq!(b.tile(at(10, 9)), Tile::Floor);
        // Killed on tick 4 (even), so the animation starts at 11
        assert_eq!(tank.animation_timer, 11);

        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.get(1).unwrap().animation_timer, 10);
    }

    #[test]
    fn test_kill_twice_cancels_animation() {
        let b = board();
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(4, 4), CreatureId::Bug, Direction::Up)], &b);
        list.kill(1, &b);
        assert!(list.get(1).unwrap().animation_timer > 0);
        assert!(!list.is_claimed(at(4, 4)));
        list.kill(1, &b);
        assert_eq!(list.get(1).unwrap().animation_timer, 0);
        assert!(list.get(1).unwrap().is_expired());
    }

    #[test]
    fn test_teleport_with_all_exits_blocked_stays_put() {
        let mut b = board();
        let pads = [at(5, 5), at(15, 5), at(25, 5)];
        for &p in &pads {
            b.set_tile(p, Tile::Teleport);
        }
        b.teleports = pads.to_vec();
        // Block every exit going right, including the origin's own
        for &p in &pads {
            b.set_tile(p.step(Direction::Right).unwrap(), Tile::Wall);
        }
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(14, 5), CreatureId::Tank, Direction::Right)], &b);

        for _ in 0..4 {
            full_tick(&mut list, &mut b, Direction::None);
        }
        let tank = list.get(1).unwrap();
        assert_eq!(tank.position, at(15, 5));
        assert!(tank.is_alive());
        assert!(tank.teleport_flag);
        assert!(list.is_claimed(at(15, 5)));
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_teleport_walks_list_backwards() {
        let mut b = board();
        let pads = [at(5, 5), at(15, 5), at(25, 5)];
        for &p in &pads {
            b.set_tile(p, Tile::Teleport);
        }
        b.teleports = pads.to_vec();
        // Previous pad (5,5) is blocked, so the tank wraps to (25,5)
        b.set_tile(at(6, 5), Tile::Wall);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(at(14, 5), CreatureId::Tank, Direction::Right)], &b);

        for _ in 0..4 {
            full_tick(&mut list, &mut b, Direction::None);
        }
        assert_eq!(list.get(1).unwrap().position, at(25, 5));
        assert!(!list.is_claimed(at(15, 5)));
        assert!(list.is_claimed(at(25, 5)));

        // Next tick the flagged tank is forced out of the destination pad
        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.get(1).unwrap().position, at(26, 5));
        assert!(!list.get(1).unwrap().teleport_flag);
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_clone_machine_appends_and_moves_clone() {
        let mut b = board();
        let machine = at(10, 10);
        b.set_tile(machine, Tile::CloneMachine);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(machine, CreatureId::Glider, Direction::Left)], &b);

        list.initialise(&b);
        assert!(list.clone_from(machine, &mut b));
        list.finalise();

        assert_eq!(list.len(), 3);
        let clone = list.get(2).unwrap();
        assert_eq!(clone.kind, CreatureId::Glider);
        assert_eq!(clone.position, at(9, 10));
        assert_eq!(clone.time_traveled, 6);
        assert!(list.is_claimed(at(9, 10)));
        assert!(!list.is_claimed(machine));

        // Exit now claimed, so a second clone is refused
        assert!(!list.clone_from(machine, &mut b));
        assert_eq!(list.len(), 3);
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_clone_reuses_expired_slot() {
        let mut b = board();
        let machine = at(10, 10);
        b.set_tile(machine, Tile::CloneMachine);
        let mut expired = Creature::new(at(2, 2), CreatureId::Bug, Direction::Up);
        expired.kind = CreatureId::Dead;
        let mut list = setup(
            vec![chip_at(0, 0), expired, Creature::new(machine, CreatureId::Ball, Direction::Up)],
            &b,
        );

        assert!(list.clone_from(machine, &mut b));
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).unwrap().kind, CreatureId::Ball);
        assert_eq!(list.get(1).unwrap().position, at(10, 9));
    }

    #[test]
    fn test_brown_button_releases_trap() {
        let mut b = board();
        let trap = at(10, 10);
        let button = at(10, 12);
        b.set_tile(trap, Tile::Trap);
        b.set_tile(button, Tile::ButtonBrown);
        b.buttons.insert(button, Button::Brown { trap });
        let mut list = setup(
            vec![
                chip_at(0, 0),
                Creature::new(trap, CreatureId::Tank, Direction::Up),
                Creature::new(at(10, 13), CreatureId::Tank, Direction::Up),
            ],
            &b,
        );

        // Trapped tank does not move on its own
        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.get(1).unwrap().position, trap);

        // Second tank reaches the button on tick 4 and springs the trap
        for _ in 0..3 {
            full_tick(&mut list, &mut b, Direction::None);
        }
        assert_eq!(list.get(2).unwrap().position, button);
        assert_eq!(list.get(1).unwrap().position, at(10, 9));
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_trapped_bug_turns_in_place() {
        let mut b = board();
        let trap = at(10, 10);
        b.set_tile(trap, Tile::Trap);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(trap, CreatureId::Bug, Direction::Up)], &b);

        // Every candidate is refused by the trap, so the bug ends up facing
        // the last one it tried
        full_tick(&mut list, &mut b, Direction::None);
        let bug = list.get(1).unwrap();
        assert_eq!(bug.position, trap);
        assert_eq!(bug.direction, Direction::Down);
        assert_eq!(bug.time_traveled, 0);

        // Released, it leaves the way it now faces
        list.spring_trap(trap, &mut b);
        assert_eq!(list.get(1).unwrap().position, at(10, 11));
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_trapped_blob_draws_and_turns() {
        let mut b = board();
        let trap = at(10, 10);
        b.set_tile(trap, Tile::Trap);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(trap, CreatureId::Blob, Direction::Up)], &b);

        let mut expected_rng = b.rng.clone();
        let expected = BLOB_DIRECTIONS[expected_rng.random4() as usize];
        let registers = b.rng.registers();

        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(b.rng.current(), expected_rng.current());
        assert_ne!(b.rng.current(), 1);
        assert_eq!(b.rng.registers(), registers);
        let blob = list.get(1).unwrap();
        assert_eq!(blob.position, trap);
        assert_eq!(blob.direction, expected);
    }

    #[test]
    fn test_trapped_walker_draws_and_turns() {
        let mut b = board();
        let trap = at(10, 10);
        b.set_tile(trap, Tile::Trap);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(trap, CreatureId::Walker, Direction::Left)], &b);

        let mut expected_rng = b.rng.clone();
        let turns = expected_rng.pseudo_random4();
        let expected = (0..turns).fold(Direction::Left, |d, _| d.right());

        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(b.rng.registers(), expected_rng.registers());
        assert_ne!(b.rng.registers(), (0x12, 0x34));
        assert_eq!(b.rng.current(), 1);
        let walker = list.get(1).unwrap();
        assert_eq!(walker.position, trap);
        assert_eq!(walker.direction, expected);
    }

    #[test]
    fn test_clone_machine_template_sits_out_selection() {
        let mut b = board();
        let machine = at(10, 10);
        b.set_tile(machine, Tile::CloneMachine);
        let mut list = setup(vec![chip_at(0, 0), Creature::new(machine, CreatureId::Blob, Direction::Left)], &b);

        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(b.rng.current(), 1);
        assert_eq!(b.rng.registers(), (0x12, 0x34));
        let blob = list.get(1).unwrap();
        assert_eq!(blob.position, machine);
        assert_eq!(blob.direction, Direction::Left);
        assert_eq!(blob.t_direction, Direction::None);
    }

    #[test]
    fn test_blue_button_turns_tanks() {
        let b = board();
        let mut list = setup(
            vec![
                chip_at(0, 0),
                Creature::new(at(3, 3), CreatureId::Tank, Direction::Up),
                Creature::new(at(4, 4), CreatureId::Bug, Direction::Up),
            ],
            &b,
        );
        list.turn_tanks();
        assert_eq!(list.get(1).unwrap().direction, Direction::Down);
        assert_eq!(list.get(2).unwrap().direction, Direction::Up);
    }

    #[test]
    fn test_chip_pushes_block() {
        let mut b = board();
        let mut list = setup(vec![chip_at(5, 5), Creature::new(at(6, 5), CreatureId::Block, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::Right);
        assert_eq!(list.chip().position, at(6, 5));
        assert_eq!(list.get(1).unwrap().position, at(7, 5));
        assert_eq!(list.get(1).unwrap().direction, Direction::Right);
        assert!(list.chip().is_alive());
        assert_claims_consistent(&list, &b);
    }

    #[test]
    fn test_blocked_block_stops_chip() {
        let mut b = board();
        b.set_tile(at(7, 5), Tile::Wall);
        let mut list = setup(vec![chip_at(5, 5), Creature::new(at(6, 5), CreatureId::Block, Direction::Up)], &b);

        full_tick(&mut list, &mut b, Direction::Right);
        assert_eq!(list.chip().position, at(5, 5));
        assert_eq!(list.chip().direction, Direction::Right);
        assert_eq!(list.get(1).unwrap().position, at(6, 5));
    }

    #[test]
    fn test_hidden_wall_exposed_on_contact() {
        let mut b = board();
        b.set_tile(at(5, 6), Tile::HiddenWallTemp);
        let mut list = setup(vec![chip_at(5, 5)], &b);

        full_tick(&mut list, &mut b, Direction::Down);
        assert_eq!(b.tile(at(5, 6)), Tile::Wall);
        assert_eq!(list.chip().position, at(5, 5));
    }

    #[test]
    fn test_diagonal_prefers_current_axis() {
        let mut b = board();
        let mut chip = chip_at(5, 5);
        chip.direction = Direction::Right;
        let mut list = setup(vec![chip], &b);

        full_tick(&mut list, &mut b, Direction::DownRight);
        assert_eq!(list.chip().position, at(6, 5));

        // Facing down now blocked, so the horizontal part is taken
        let mut b = board();
        b.set_tile(at(5, 6), Tile::Wall);
        let mut list = setup(vec![chip_at(5, 5)], &b);
        full_tick(&mut list, &mut b, Direction::DownRight);
        assert_eq!(list.chip().position, at(6, 5));
    }

    #[test]
    fn test_chip_slides_on_ice_and_bounces() {
        let mut b = board();
        b.set_tile(at(5, 6), Tile::Ice);
        b.set_tile(at(5, 7), Tile::Ice);
        b.set_tile(at(5, 8), Tile::Wall);
        let mut list = setup(vec![chip_at(5, 5)], &b);

        // Speed comes from the destination, so stepping onto ice takes two ticks
        full_tick(&mut list, &mut b, Direction::Down);
        assert_eq!(list.chip().time_traveled, 4);
        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.chip().position, at(5, 6));
        assert_eq!(list.chip().time_traveled, 0);

        // Input is ignored while forced
        full_tick(&mut list, &mut b, Direction::Left);
        assert_eq!(list.chip().position, at(5, 7));
        assert!(list.chip().sliding);
        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.chip().time_traveled, 0);

        // Wall ahead: Chip bounces to face back up
        full_tick(&mut list, &mut b, Direction::None);
        assert_eq!(list.chip().position, at(5, 7));
        assert_eq!(list.chip().direction, Direction::Up);
    }

    #[test]
    fn test_pickups_and_doors() {
        let mut b = board();
        b.set_tile(at(5, 6), Tile::KeyRed);
        b.set_tile(at(5, 7), Tile::DoorRed);
        b.set_tile(at(5, 8), Tile::Chip);
        b.inventory.chips_left = 1;
        let mut list = setup(vec![chip_at(5, 5)], &b);

        for _ in 0..12 {
            full_tick(&mut list, &mut b, Direction::Down);
        }
        assert_eq!(list.chip().position, at(5, 8));
        assert_eq!(b.inventory.keys, [0; 4]);
        assert_eq!(b.inventory.chips_left, 0);
        assert_eq!(b.tile(at(5, 6)), Tile::Floor);
        assert_eq!(b.tile(at(5, 7)), Tile::Floor);
        assert_eq!(b.tile(at(5, 8)), Tile::Floor);
    }

    #[test]
    fn test_phases_cycle() {
        let mut b = board();
        let mut list = setup(vec![chip_at(0, 0)], &b);
        assert_eq!(list.phase(), Phase::Select);
        list.tick(&mut b);
        assert_eq!(list.phase(), Phase::Move);
        list.tick(&mut b);
        assert_eq!(list.phase(), Phase::Teleport);
        list.tick(&mut b);
        assert_eq!(list.phase(), Phase::Select);
    }
}
