//! Player records. Grounded in
//! `original_source/uecda_server/uecda_server/models/player.py` (`Player`,
//! `PlayerRank`) and `daifugo-net`'s `Profile`/`Connection`.

use daifugo_net::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassRank {
    Daifugo = 0,
    Fugo = 1,
    Heimin = 2,
    Hinmin = 3,
    Daihinmin = 4,
}

impl ClassRank {
    pub fn from_finish_position(position: usize) -> ClassRank {
        match position {
            0 => ClassRank::Daifugo,
            1 => ClassRank::Fugo,
            2 => ClassRank::Heimin,
            3 => ClassRank::Hinmin,
            _ => ClassRank::Daihinmin,
        }
    }
}

pub struct Player {
    pub id: u32,
    pub name: String,
    pub protocol_version: u32,
    pub seat: u32,
    pub connection: Connection,
    pub class_rank: ClassRank,
    pub passed_this_trick: bool,
    pub finished_this_game: bool,
    pub finish_position: Option<usize>,
}

impl Player {
    pub fn new(id: u32, name: String, protocol_version: u32, seat: u32, connection: Connection) -> Player {
        Player {
            id,
            name,
            protocol_version,
            seat,
            connection,
            class_rank: ClassRank::Heimin,
            passed_this_trick: false,
            finished_this_game: false,
            finish_position: None,
        }
    }

    pub fn reset_for_new_game(&mut self) {
        self.passed_this_trick = false;
        self.finished_this_game = false;
        self.finish_position = None;
    }

    pub fn reset_turn_state(&mut self) {
        self.passed_this_trick = false;
    }
}
