use core::fmt::{self, Display, Formatter};

use bitflags::bitflags;

bitflags! {
    /// Unix permission bits of an entry
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        const SETUID = 0o4000;
        const SETGID = 0o2000;
        const STICKY = 0o1000;

        const USER_READ = 0o400;
        const USER_WRITE = 0o200;
        const USER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;

        const PERM = 0o777;
    }
}

impl Mode {
    /// The nine permission bits as in `ls -l`, most significant first
    pub fn permissions(&self) -> [char; 9] {
        const BITS: [(Mode, char); 9] = [
            (Mode::USER_READ, 'r'),
            (Mode::USER_WRITE, 'w'),
            (Mode::USER_EXEC, 'x'),
            (Mode::GROUP_READ, 'r'),
            (Mode::GROUP_WRITE, 'w'),
            (Mode::GROUP_EXEC, 'x'),
            (Mode::OTHER_READ, 'r'),
            (Mode::OTHER_WRITE, 'w'),
            (Mode::OTHER_EXEC, 'x'),
        ];
        BITS.map(|(bit, c)| if self.contains(bit) { c } else { '-' })
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.permissions().iter().try_for_each(|c| write!(f, "{}", c))
    }
}
