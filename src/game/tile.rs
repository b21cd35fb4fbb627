//! Tile Classification
//!
//! The 112 tile codes of the Lynx foreground layer and the predicates the
//! simulation asks of them. Codes are the on-disk byte values.

use serde::{Deserialize, Serialize};

use crate::core::direction::Direction;

/// A foreground tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Tile {
    #[default]
    Floor = 0x00,
    Wall = 0x01,
    Chip = 0x02,
    Water = 0x03,
    Fire = 0x04,
    InvisibleWall = 0x05,
    ThinWallUp = 0x06,
    ThinWallLeft = 0x07,
    ThinWallDown = 0x08,
    ThinWallRight = 0x09,
    Block = 0x0A,
    Dirt = 0x0B,
    Ice = 0x0C,
    ForceDown = 0x0D,
    BlockUp = 0x0E,
    BlockLeft = 0x0F,
    BlockDown = 0x10,
    BlockRight = 0x11,
    ForceUp = 0x12,
    ForceRight = 0x13,
    ForceLeft = 0x14,
    Exit = 0x15,
    DoorBlue = 0x16,
    DoorRed = 0x17,
    DoorGreen = 0x18,
    DoorYellow = 0x19,
    IceSlideSouthEast = 0x1A,
    IceSlideSouthWest = 0x1B,
    IceSlideNorthWest = 0x1C,
    IceSlideNorthEast = 0x1D,
    BlueWallFake = 0x1E,
    BlueWallReal = 0x1F,
    OverlayBuffer = 0x20,
    Thief = 0x21,
    Socket = 0x22,
    ButtonGreen = 0x23,
    ButtonRed = 0x24,
    ToggleClosed = 0x25,
    ToggleOpen = 0x26,
    ButtonBrown = 0x27,
    ButtonBlue = 0x28,
    Teleport = 0x29,
    Bomb = 0x2A,
    Trap = 0x2B,
    HiddenWallTemp = 0x2C,
    Gravel = 0x2D,
    PopUpWall = 0x2E,
    Hint = 0x2F,
    ThinWallDownRight = 0x30,
    CloneMachine = 0x31,
    ForceRandom = 0x32,
    DrownedChip = 0x33,
    BurnedChip = 0x34,
    BombedChip = 0x35,
    Unused36 = 0x36,
    Unused37 = 0x37,
    IceBlock = 0x38,
    ExitedChip = 0x39,
    ExitExtra1 = 0x3A,
    ExitExtra2 = 0x3B,
    ChipSwimmingUp = 0x3C,
    ChipSwimmingLeft = 0x3D,
    ChipSwimmingDown = 0x3E,
    ChipSwimmingRight = 0x3F,
    BugUp = 0x40,
    BugLeft = 0x41,
    BugDown = 0x42,
    BugRight = 0x43,
    FireballUp = 0x44,
    FireballLeft = 0x45,
    FireballDown = 0x46,
    FireballRight = 0x47,
    BallUp = 0x48,
    BallLeft = 0x49,
    BallDown = 0x4A,
    BallRight = 0x4B,
    TankUp = 0x4C,
    TankLeft = 0x4D,
    TankDown = 0x4E,
    TankRight = 0x4F,
    GliderUp = 0x50,
    GliderLeft = 0x51,
    GliderDown = 0x52,
    GliderRight = 0x53,
    TeethUp = 0x54,
    TeethLeft = 0x55,
    TeethDown = 0x56,
    TeethRight = 0x57,
    WalkerUp = 0x58,
    WalkerLeft = 0x59,
    WalkerDown = 0x5A,
    WalkerRight = 0x5B,
    BlobUp = 0x5C,
    BlobLeft = 0x5D,
    BlobDown = 0x5E,
    BlobRight = 0x5F,
    ParameciumUp = 0x60,
    ParameciumLeft = 0x61,
    ParameciumDown = 0x62,
    ParameciumRight = 0x63,
    KeyBlue = 0x64,
    KeyRed = 0x65,
    KeyGreen = 0x66,
    KeyYellow = 0x67,
    BootsWater = 0x68,
    BootsFire = 0x69,
    BootsIce = 0x6A,
    BootsSlide = 0x6B,
    ChipUp = 0x6C,
    ChipLeft = 0x6D,
    ChipDown = 0x6E,
    ChipRight = 0x6F,
}

/// Number of tile codes.
pub const TILE_COUNT: usize = 0x70;

use Tile::*;

const ALL_TILES: [Tile; TILE_COUNT] = [
    Floor, Wall, Chip, Water, Fire, InvisibleWall, ThinWallUp, ThinWallLeft,
    ThinWallDown, ThinWallRight, Block, Dirt, Ice, ForceDown, BlockUp, BlockLeft,
    BlockDown, BlockRight, ForceUp, ForceRight, ForceLeft, Exit, DoorBlue, DoorRed,
    DoorGreen, DoorYellow, IceSlideSouthEast, IceSlideSouthWest, IceSlideNorthWest, IceSlideNorthEast, BlueWallFake, BlueWallReal,
    OverlayBuffer, Thief, Socket, ButtonGreen, ButtonRed, ToggleClosed, ToggleOpen, ButtonBrown,
    ButtonBlue, Teleport, Bomb, Trap, HiddenWallTemp, Gravel, PopUpWall, Hint,
    ThinWallDownRight, CloneMachine, ForceRandom, DrownedChip, BurnedChip, BombedChip, Unused36, Unused37,
    IceBlock, ExitedChip, ExitExtra1, ExitExtra2, ChipSwimmingUp, ChipSwimmingLeft, ChipSwimmingDown, ChipSwimmingRight,
    BugUp, BugLeft, BugDown, BugRight, FireballUp, FireballLeft, FireballDown, FireballRight,
    BallUp, BallLeft, BallDown, BallRight, TankUp, TankLeft, TankDown, TankRight,
    GliderUp, GliderLeft, GliderDown, GliderRight, TeethUp, TeethLeft, TeethDown, TeethRight,
    WalkerUp, WalkerLeft, WalkerDown, WalkerRight, BlobUp, BlobLeft, BlobDown, BlobRight,
    ParameciumUp, ParameciumLeft, ParameciumDown, ParameciumRight, KeyBlue, KeyRed, KeyGreen, KeyYellow,
    BootsWater, BootsFire, BootsIce, BootsSlide, ChipUp, ChipLeft, ChipDown, ChipRight,
];

impl Tile {
    /// Decode a layer byte, `None` above 0x6F.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        ALL_TILES.get(byte as usize).copied()
    }

    /// Layer byte.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    #[inline]
    fn in_range(self, first: Tile, last: Tile) -> bool {
        (first as u8..=last as u8).contains(&(self as u8))
    }

    /// Plain ice or one of the four ice corners.
    pub fn is_ice(self) -> bool {
        self == Ice || self.in_range(IceSlideSouthEast, IceSlideNorthEast)
    }

    /// A force floor, including the random one.
    pub fn is_force_floor(self) -> bool {
        matches!(self, ForceUp | ForceLeft | ForceDown | ForceRight | ForceRandom)
    }

    /// Terrain that can impose a move: ice, force floors, teleports.
    pub fn is_sliding(self) -> bool {
        self.is_ice() || self.is_force_floor() || self == Teleport
    }

    /// A Chip drawing tile (`ChipUp..=ChipRight`).
    pub fn is_chip(self) -> bool {
        self.in_range(ChipUp, ChipRight)
    }

    /// A swimming-Chip drawing tile.
    pub fn is_swimming_chip(self) -> bool {
        self.in_range(ChipSwimmingUp, ChipSwimmingRight)
    }

    /// A directional block spawn tile.
    pub fn is_clone_block(self) -> bool {
        self.in_range(BlockUp, BlockRight)
    }

    /// Bug through Paramecium in any facing.
    pub fn is_monster(self) -> bool {
        self.in_range(BugUp, ParameciumRight)
    }

    /// Any tile that spawns a creature at load time.
    pub fn is_creature(self) -> bool {
        self.is_monster() || self.is_clone_block() || self == Block || self.is_chip() || self.is_swimming_chip()
    }

    /// A door of any colour.
    pub fn is_door(self) -> bool {
        self.in_range(DoorBlue, DoorYellow)
    }

    /// A key of any colour.
    pub fn is_key(self) -> bool {
        self.in_range(KeyBlue, KeyYellow)
    }

    /// One of the four boots.
    pub fn is_boot(self) -> bool {
        self.in_range(BootsWater, BootsSlide)
    }

    /// Key or boot.
    pub fn is_pickup(self) -> bool {
        self.is_key() || self.is_boot()
    }

    /// Green, red, brown or blue button.
    pub fn is_button(self) -> bool {
        matches!(self, ButtonGreen | ButtonRed | ButtonBrown | ButtonBlue)
    }

    /// Literal direction of a plain force floor.
    pub fn force_direction(self) -> Option<Direction> {
        match self {
            ForceUp => Some(Direction::Up),
            ForceLeft => Some(Direction::Left),
            ForceDown => Some(Direction::Down),
            ForceRight => Some(Direction::Right),
            _ => None,
        }
    }

    /// Inventory slot (0..4) for a key or its matching door.
    pub fn key_slot(self) -> Option<usize> {
        match self {
            KeyBlue | DoorBlue => Some(0),
            KeyRed | DoorRed => Some(1),
            KeyGreen | DoorGreen => Some(2),
            KeyYellow | DoorYellow => Some(3),
            _ => None,
        }
    }

    /// Inventory slot (0..4) for a boot: water, fire, ice, slide.
    pub fn boot_slot(self) -> Option<usize> {
        match self {
            BootsWater => Some(0),
            BootsFire => Some(1),
            BootsIce => Some(2),
            BootsSlide => Some(3),
            _ => None,
        }
    }

    /// Drawing tile for `base` (an `*Up` tile) turned to a cardinal facing.
    pub(crate) fn facing(base: Tile, direction: Direction) -> Tile {
        let offset = if direction.is_cardinal() { direction.code() } else { 0 };
        Tile::from_byte(base.byte() | offset).unwrap_or(base)
    }
}

impl TryFrom<u8> for Tile {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Tile::from_byte(byte).ok_or(byte)
    }
}

// =============================================================================
// TESTS
// =============================================================================
