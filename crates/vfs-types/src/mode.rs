use bitflags::bitflags;

bitflags! {
    /// Permission bits (low 12) union'd with a type bit (spec §3).
    ///
    /// Exactly one type bit may be set; none set means a regular file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct FileMode: u32 {
        const PERM_MASK   = 0o7777;

        const TYPE_DIR        = 1 << 16;
        const TYPE_SYMLINK    = 1 << 17;
        const TYPE_NAMED_PIPE = 1 << 18;
        const TYPE_SOCKET     = 1 << 19;
        const TYPE_DEVICE     = 1 << 20;
        const TYPE_CHAR_DEVICE = 1 << 21;
        const TYPE_IRREGULAR  = 1 << 22;
    }
}

const TYPE_BITS: FileMode = FileMode::TYPE_DIR
    .union(FileMode::TYPE_SYMLINK)
    .union(FileMode::TYPE_NAMED_PIPE)
    .union(FileMode::TYPE_SOCKET)
    .union(FileMode::TYPE_DEVICE)
    .union(FileMode::TYPE_CHAR_DEVICE)
    .union(FileMode::TYPE_IRREGULAR);

impl FileMode {
    /// Permission bits only, with any type bit stripped.
    pub const fn permissions(self) -> u32 {
        self.bits() & Self::PERM_MASK.bits()
    }

    /// Build a mode from permission bits plus an explicit file type.
    pub fn new(perm: u32, file_type: FileType) -> Self {
        let perm_bits = FileMode::from_bits_truncate(perm & Self::PERM_MASK.bits());
        perm_bits | file_type.type_bit()
    }

    pub fn is_dir(self) -> bool {
        self.contains(FileMode::TYPE_DIR)
    }

    /// A regular file has no type bit set.
    pub fn is_regular(self) -> bool {
        (self & TYPE_BITS).is_empty()
    }

    /// Derive the [`FileType`] this mode's type bit encodes.
    pub fn file_type(self) -> FileType {
        if self.contains(FileMode::TYPE_DIR) {
            FileType::Dir
        } else if self.contains(FileMode::TYPE_SYMLINK) {
            FileType::Symlink
        } else if self.contains(FileMode::TYPE_NAMED_PIPE) {
            FileType::NamedPipe
        } else if self.contains(FileMode::TYPE_SOCKET) {
            FileType::Socket
        } else if self.contains(FileMode::TYPE_DEVICE) {
            FileType::Device
        } else if self.contains(FileMode::TYPE_CHAR_DEVICE) {
            FileType::CharDevice
        } else if self.contains(FileMode::TYPE_IRREGULAR) {
            FileType::Irregular
        } else {
            FileType::Regular
        }
    }
}

/// Enumerated form of a [`FileMode`]'s type bit, for callers that would
/// rather `match` than test bits directly (query-engine file-type filter,
/// stat conversion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Regular,
    Dir,
    Symlink,
    NamedPipe,
    Socket,
    Device,
    CharDevice,
    Irregular,
}

impl FileType {
    fn type_bit(self) -> FileMode {
        match self {
            FileType::Regular => FileMode::empty(),
            FileType::Dir => FileMode::TYPE_DIR,
            FileType::Symlink => FileMode::TYPE_SYMLINK,
            FileType::NamedPipe => FileMode::TYPE_NAMED_PIPE,
            FileType::Socket => FileMode::TYPE_SOCKET,
            FileType::Device => FileMode::TYPE_DEVICE,
            FileType::CharDevice => FileMode::TYPE_CHAR_DEVICE,
            FileType::Irregular => FileMode::TYPE_IRREGULAR,
        }
    }
}
