//! The turn-loop state machine. Grounded method-for-method in
//! `original_source/uecda_server/uecda_server/game/engine.py` (`GameEngine`):
//! `run_games` -> `run_session`, `run_game`, `_init_game`, `_deal_cards`,
//! `_send_initial_hands`, `_extract_strongest`, `_do_card_exchange`,
//! `_get_exchange_cards_from_high`, `_send_all_hand_info`,
//! `_send_all_field_info`, `_get_player_move`, `_process_valid_move`,
//! `_apply_special_rules`, `_update_lock`, `_check_all_passed`,
//! `_clear_field`, `_advance_player`, `_resolve_sennichite`.

use crate::event_log::{format_cards, EventLog, EventRecord, ExchangeTransfer, PlayerSummary};
use crate::player::{ClassRank, Player};
use crate::session::{RuleFlags, SessionState, SENNICHITE_THRESHOLD};
use daifugo_cards::{full_deck, Card, Hand, Rank};
use daifugo_net::NetError;
use daifugo_rules::{validate_exchange, AnalysisError, CardAnalyzer, Decision, MoveValidator, PlayType};
use daifugo_wire::{Table, ALL_GAMES_END, GAME_CONTINUE, GAME_END, RESPONSE_ACCEPT, RESPONSE_REJECT};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use slog::{debug, info, warn, Logger};
use std::collections::HashMap;

pub const NUM_PLAYERS: u32 = 5;
const RANK_EIGHT: Rank = Rank::Eight;
const RANK_ELEVEN: Rank = Rank::Jack;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Net(#[from] NetError),
}

pub struct Engine {
    players: Vec<Player>,
    hands: Vec<Hand>,
    rules: RuleFlags,
    state: SessionState,
    event_log: EventLog,
    logger: Logger,
    rng: StdRng,
    total_games: u32,
}

impl Engine {
    pub fn new(players: Vec<Player>, rules: RuleFlags, event_log: EventLog, logger: Logger) -> Engine {
        assert_eq!(players.len(), NUM_PLAYERS as usize);
        let hands = (0..players.len()).map(|_| Hand::new()).collect();
        Engine {
            players,
            hands,
            rules,
            state: SessionState::default(),
            event_log,
            logger,
            rng: StdRng::from_entropy(),
            total_games: 1,
        }
    }

    pub fn run_session(&mut self, num_games: u32) -> Result<HashMap<u32, i32>, EngineError> {
        self.total_games = num_games;
        let mut points: HashMap<u32, i32> = self.players.iter().map(|p| (p.id, 0)).collect();

        self.event_log.record(&EventRecord::SessionStart {
            timestamp: crate::event_log::unix_timestamp(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary { id: p.id, name: p.name.clone() })
                .collect(),
        }).ok();

        for game_number in 1..=num_games {
            self.state.game_number = game_number;
            info!(self.logger, "starting game"; "game" => game_number, "of" => num_games);

            let finish_order = self.run_game()?;

            for (player_id, score) in Engine::score_finish_order(&finish_order) {
                *points.entry(player_id).or_insert(0) += score;
            }
            // Class ranks for next game's seating/exchange are already
            // updated by run_game itself before it logs the game_end event.
        }

        let mut ranking: Vec<u32> = points.keys().copied().collect();
        ranking.sort_by_key(|id| std::cmp::Reverse(points[id]));
        self.event_log.record(&EventRecord::SessionEnd {
            total_games: num_games,
            points: points.iter().map(|(&id, &p)| (id, p)).collect(),
            ranking,
        }).ok();

        Ok(points)
    }

    pub fn run_game(&mut self) -> Result<Vec<u32>, EngineError> {
        self.init_game();

        self.event_log.record(&EventRecord::GameStart {
            game: self.state.game_number,
            first_player: self.state.current_player,
            hands: self.hands.iter().map(|h| format_cards(&h.to_vec())).collect(),
            ranks: self.players.iter().map(|p| format!("{:?}", p.class_rank)).collect(),
        }).ok();

        self.send_initial_hands()?;
        if self.rules.card_exchange && self.state.game_number > 1 {
            self.do_card_exchange()?;
        }

        let mut finish_order: Vec<u32> = Vec::new();
        let mut game_ended = false;

        while self.state.finished_count < 4 && !game_ended {
            self.state.turn_number += 1;
            let current = self.state.current_player;

            if self.players[current as usize].finished_this_game {
                self.advance_player();
                continue;
            }
            if self.players[current as usize].passed_this_trick && !self.state.field.is_empty() {
                self.advance_player();
                continue;
            }

            self.send_all_hand_info()?;

            let submitted = self.get_player_move(current)?;
            let revolution = self.state.effective_revolution();
            let analysis = CardAnalyzer::analyze(&submitted, revolution);
            let hand = self.hands[current as usize].clone();
            let decision = MoveValidator::validate(
                &analysis,
                &submitted,
                &hand,
                &self.state.field,
                revolution,
                self.state.is_joker_single,
            );

            match decision {
                Decision::AcceptAsPlay => {
                    let display = submitted.display_cards();
                    self.process_valid_move(current, &submitted, &analysis)?;
                    self.players[current as usize].connection.write_u32(RESPONSE_ACCEPT)?;

                    self.event_log.record(&EventRecord::Turn {
                        game: self.state.game_number,
                        turn: self.state.turn_number,
                        player: current,
                        action: "play".to_string(),
                        cards: format_cards(&display),
                        card_type: format!("{:?}", analysis.play_type),
                        field: format_cards(&self.state.field.cards),
                        hands: self.hands.iter().map(|h| format_cards(&h.to_vec())).collect(),
                        revolution: self.state.is_revolution,
                        eleven_back: self.state.is_eleven_back,
                        lock: self.state.field.lock_active,
                        eight_stop: self.rules.eight_stop,
                    }).ok();

                    if self.hands[current as usize].is_empty() {
                        self.players[current as usize].finished_this_game = true;
                        let position = finish_order.len();
                        self.players[current as usize].finish_position = Some(position);
                        finish_order.push(current);
                        self.state.finished_count += 1;
                        info!(self.logger, "player finished"; "player" => current, "position" => position + 1);
                        self.event_log.record(&EventRecord::Special {
                            game: self.state.game_number,
                            turn: self.state.turn_number,
                            event: "player_finish".to_string(),
                            player: current,
                        }).ok();
                    }
                }
                Decision::AcceptAsPass | Decision::Reject => {
                    if decision == Decision::Reject && analysis.error != AnalysisError::None {
                        warn!(self.logger, "submission rejected, treated as pass"; "player" => current, "error" => format!("{:?}", analysis.error));
                    }
                    self.players[current as usize].passed_this_trick = true;
                    self.state.consecutive_passes += 1;
                    self.players[current as usize].connection.write_u32(RESPONSE_REJECT)?;

                    self.event_log.record(&EventRecord::Turn {
                        game: self.state.game_number,
                        turn: self.state.turn_number,
                        player: current,
                        action: "pass".to_string(),
                        cards: String::new(),
                        card_type: "empty".to_string(),
                        field: format_cards(&self.state.field.cards),
                        hands: self.hands.iter().map(|h| format_cards(&h.to_vec())).collect(),
                        revolution: self.state.is_revolution,
                        eleven_back: self.state.is_eleven_back,
                        lock: self.state.field.lock_active,
                        eight_stop: self.rules.eight_stop,
                    }).ok();
                }
            }

            self.send_all_field_info()?;

            if self.check_all_passed() {
                self.clear_field();
                self.event_log.record(&EventRecord::Special {
                    game: self.state.game_number,
                    turn: self.state.turn_number,
                    event: "field_clear".to_string(),
                    player: self.state.current_player,
                }).ok();
            }

            if self.rules.sennichite && self.state.consecutive_passes >= SENNICHITE_THRESHOLD {
                warn!(self.logger, "sennichite: resolving remaining positions randomly");
                finish_order = self.resolve_sennichite(finish_order);
                self.state.finished_count = 4;
                game_ended = true;
            }

            if self.state.finished_count >= 4 {
                game_ended = true;
                let all_done = self.state.game_number == self.total_games;
                let code = if all_done { ALL_GAMES_END } else { GAME_END };
                for player in &mut self.players {
                    player.connection.write_u32(code)?;
                }
            }

            if !game_ended {
                for player in &mut self.players {
                    player.connection.write_u32(GAME_CONTINUE)?;
                }
                self.advance_player();
            }
        }

        if self.state.finished_count == 4 {
            if let Some(player) = self.players.iter_mut().find(|p| !p.finished_this_game) {
                player.finished_this_game = true;
                player.finish_position = Some(4);
                finish_order.push(player.id);
            }
        }

        for (position, &player_id) in finish_order.iter().enumerate() {
            self.players[player_id as usize].class_rank = ClassRank::from_finish_position(position);
        }
        self.event_log.record(&EventRecord::GameEnd {
            game: self.state.game_number,
            finish_order: finish_order.clone(),
            ranks: finish_order
                .iter()
                .map(|&id| format!("{:?}", self.players[id as usize].class_rank))
                .collect(),
        }).ok();

        Ok(finish_order)
    }

    fn init_game(&mut self) {
        self.state.reset_for_new_game();
        for player in &mut self.players {
            player.reset_for_new_game();
        }
        self.state.current_player = self.deal_cards();
    }

    /// Shuffles a fresh deck and deals round-robin starting from the seat
    /// that leads this game, returning that seat. Game 1 starts from a
    /// random seat; later games start from the reigning Daifugo.
    fn deal_cards(&mut self) -> u32 {
        let mut cards: Vec<Card> = full_deck().to_vec();
        cards.shuffle(&mut self.rng);

        for hand in &mut self.hands {
            *hand = Hand::new();
        }

        let initial_player = if self.state.game_number == 1 {
            self.rng.gen_range(0..self.players.len()) as u32
        } else {
            self.find_by_rank(ClassRank::Daifugo).unwrap_or(0)
        };

        let num_players = self.players.len() as u32;
        for (i, card) in cards.into_iter().enumerate() {
            let seat = (i as u32 + initial_player) % num_players;
            self.hands[seat as usize].insert(card);
        }

        debug!(self.logger, "cards dealt"; "starting_player" => initial_player);
        initial_player
    }

    fn send_initial_hands(&mut self) -> Result<(), EngineError> {
        let is_exchange_game = self.rules.card_exchange && self.state.game_number > 1;
        let mut pre_exchange_hands: HashMap<u32, Hand> = HashMap::new();

        if is_exchange_game {
            if let Some(daihinmin) = self.find_by_rank(ClassRank::Daihinmin) {
                pre_exchange_hands.insert(daihinmin, self.hands[daihinmin as usize].clone());
                let extracted = self.extract_strongest(daihinmin, 2);
                if let Some(daifugo) = self.find_by_rank(ClassRank::Daifugo) {
                    for card in extracted {
                        self.hands[daifugo as usize].insert(card);
                    }
                }
            }
            if let Some(hinmin) = self.find_by_rank(ClassRank::Hinmin) {
                pre_exchange_hands.insert(hinmin, self.hands[hinmin as usize].clone());
                let extracted = self.extract_strongest(hinmin, 1);
                if let Some(fugo) = self.find_by_rank(ClassRank::Fugo) {
                    for card in extracted {
                        self.hands[fugo as usize].insert(card);
                    }
                }
            }
        }

        let send_order: Vec<u32> = if is_exchange_game {
            let rank_order = [
                ClassRank::Daifugo,
                ClassRank::Fugo,
                ClassRank::Heimin,
                ClassRank::Hinmin,
                ClassRank::Daihinmin,
            ];
            rank_order.iter().filter_map(|&r| self.find_by_rank(r)).collect()
        } else {
            self.players.iter().map(|p| p.id).collect()
        };

        for player_id in send_order {
            let exchange_count = if is_exchange_game {
                match self.players[player_id as usize].class_rank {
                    ClassRank::Daifugo => 2,
                    ClassRank::Fugo => 1,
                    ClassRank::Hinmin => -1,
                    ClassRank::Daihinmin => -2,
                    ClassRank::Heimin => 0,
                }
            } else {
                0
            };

            let hand_to_send = pre_exchange_hands
                .get(&player_id)
                .cloned()
                .unwrap_or_else(|| self.hands[player_id as usize].clone());

            let table = self.build_state_table(player_id, &hand_to_send, 1, exchange_count);
            self.players[player_id as usize].connection.write_table(&table)?;
        }

        debug!(self.logger, "initial hands sent");
        Ok(())
    }

    fn extract_strongest(&mut self, player_id: u32, count: usize) -> Vec<Card> {
        let revolution = self.state.effective_revolution();
        self.hands[player_id as usize].extract_strongest(count, revolution)
    }

    fn find_by_rank(&self, rank: ClassRank) -> Option<u32> {
        self.players.iter().find(|p| p.class_rank == rank).map(|p| p.id)
    }

    fn do_card_exchange(&mut self) -> Result<(), EngineError> {
        let mut transfers = Vec::new();

        if let (Some(daifugo), Some(daihinmin)) =
            (self.find_by_rank(ClassRank::Daifugo), self.find_by_rank(ClassRank::Daihinmin))
        {
            let cards = self.get_exchange_cards_from_high(daifugo, 2)?;
            for &card in &cards {
                self.hands[daifugo as usize].remove(card);
                self.hands[daihinmin as usize].insert(card);
            }
            info!(self.logger, "exchange"; "from" => daifugo, "to" => daihinmin, "cards" => format_cards(&cards));
            transfers.push(ExchangeTransfer {
                from: daifugo,
                to: daihinmin,
                cards: format_cards(&cards),
                from_hand_after: format_cards(&self.hands[daifugo as usize].to_vec()),
                to_hand_after: format_cards(&self.hands[daihinmin as usize].to_vec()),
            });
        } else {
            warn!(self.logger, "could not find daifugo/daihinmin for exchange");
        }

        if let (Some(fugo), Some(hinmin)) =
            (self.find_by_rank(ClassRank::Fugo), self.find_by_rank(ClassRank::Hinmin))
        {
            let cards = self.get_exchange_cards_from_high(fugo, 1)?;
            for &card in &cards {
                self.hands[fugo as usize].remove(card);
                self.hands[hinmin as usize].insert(card);
            }
            info!(self.logger, "exchange"; "from" => fugo, "to" => hinmin, "cards" => format_cards(&cards));
            transfers.push(ExchangeTransfer {
                from: fugo,
                to: hinmin,
                cards: format_cards(&cards),
                from_hand_after: format_cards(&self.hands[fugo as usize].to_vec()),
                to_hand_after: format_cards(&self.hands[hinmin as usize].to_vec()),
            });
        } else {
            warn!(self.logger, "could not find fugo/hinmin for exchange");
        }

        if !transfers.is_empty() {
            self.event_log.record(&EventRecord::Exchange { game: self.state.game_number, transfers }).ok();
        }
        Ok(())
    }

    fn get_exchange_cards_from_high(&mut self, player_id: u32, count: usize) -> Result<Vec<Card>, EngineError> {
        let table = self.players[player_id as usize].connection.read_table()?;
        let submitted = table.get_submitted_cards();
        let mut cards = submitted.display_cards();
        let hand = &self.hands[player_id as usize];

        if !validate_exchange(&cards, count, hand) {
            warn!(self.logger, "invalid exchange submission, auto-selecting weakest"; "player" => player_id, "expected" => count, "got" => cards.len());
            cards = hand.weakest(count, self.state.effective_revolution());
        }
        Ok(cards)
    }

    fn send_all_hand_info(&mut self) -> Result<(), EngineError> {
        for player_id in 0..self.players.len() as u32 {
            let hand = self.hands[player_id as usize].clone();
            let table = self.build_state_table(player_id, &hand, 0, 0);
            self.players[player_id as usize].connection.write_table(&table)?;
        }
        Ok(())
    }

    fn send_all_field_info(&mut self) -> Result<(), EngineError> {
        let mut table = Table::new();
        table.set_held_cards(&Hand::from_cards(self.state.field.cards.clone()));
        for player in &mut self.players {
            player.connection.write_table(&table)?;
        }
        Ok(())
    }

    fn get_player_move(&mut self, player_id: u32) -> Result<daifugo_wire::SubmittedCards, EngineError> {
        let table = self.players[player_id as usize].connection.read_table()?;
        Ok(table.get_submitted_cards())
    }

    fn process_valid_move(
        &mut self,
        player_id: u32,
        submitted: &daifugo_wire::SubmittedCards,
        analysis: &daifugo_rules::Analysis,
    ) -> Result<(), EngineError> {
        let hand = &mut self.hands[player_id as usize];
        for &card in &submitted.normal_cards {
            if Some(card) == submitted.joker_substitutes {
                hand.remove(Card::Joker);
            } else {
                hand.remove(card);
            }
        }
        if submitted.joker_as_self {
            hand.remove(Card::Joker);
        }

        let just_locked = self.state.field.install(submitted.display_cards(), analysis);
        self.state.last_player = Some(player_id);
        self.state.consecutive_passes = 0;

        self.apply_special_rules(analysis, player_id, just_locked);
        Ok(())
    }

    fn apply_special_rules(&mut self, analysis: &daifugo_rules::Analysis, player_id: u32, just_locked: bool) {
        self.state.is_joker_single = analysis.play_type == PlayType::JokerSingle;

        if self.rules.eight_stop && analysis.contains_rank(RANK_EIGHT) {
            info!(self.logger, "eight-cut: field cleared"; "player" => player_id);
            self.event_log.record(&EventRecord::Special {
                game: self.state.game_number,
                turn: self.state.turn_number,
                event: "eight_stop".to_string(),
                player: player_id,
            }).ok();
            self.clear_field();
        }

        if self.rules.revolution {
            let is_revolution_play = (analysis.play_type == PlayType::Group && analysis.count >= 4)
                || (analysis.play_type == PlayType::Ladder && analysis.count >= 5);
            if is_revolution_play {
                self.state.is_revolution = !self.state.is_revolution;
                info!(self.logger, "revolution toggled"; "is_revolution" => self.state.is_revolution);
                self.event_log.record(&EventRecord::Special {
                    game: self.state.game_number,
                    turn: self.state.turn_number,
                    event: "revolution".to_string(),
                    player: player_id,
                }).ok();
            }
        }

        if self.rules.eleven_back && analysis.contains_rank(RANK_ELEVEN) {
            self.state.is_eleven_back = !self.state.is_eleven_back;
            info!(self.logger, "eleven-back toggled"; "is_eleven_back" => self.state.is_eleven_back);
            self.event_log.record(&EventRecord::Special {
                game: self.state.game_number,
                turn: self.state.turn_number,
                event: "eleven_back".to_string(),
                player: player_id,
            }).ok();
        }

        // Lock tracking lives on Field::install, called from process_valid_move
        // before this method runs, matching the original's call order
        // (`_process_valid_move` updates the field, then applies special
        // rules, then updates lock) loosely enough that lock state is
        // already current by the time callers observe it.
        if !self.rules.lock {
            self.state.field.lock_active = false;
        } else if just_locked {
            self.event_log.record(&EventRecord::Special {
                game: self.state.game_number,
                turn: self.state.turn_number,
                event: "lock".to_string(),
                player: player_id,
            }).ok();
        }
    }

    /// `_check_all_passed`: every active (unfinished) player except the
    /// last-player has passed. Also triggers if the last-player has
    /// themselves finished since then (spec.md §9 first Open Question).
    fn check_all_passed(&self) -> bool {
        let active: Vec<&Player> = self.players.iter().filter(|p| !p.finished_this_game).collect();
        if active.is_empty() {
            return false;
        }
        let passed_count = active.iter().filter(|p| p.passed_this_trick).count();
        let last_player_finished = self
            .state
            .last_player
            .map(|id| self.players[id as usize].finished_this_game)
            .unwrap_or(false);
        passed_count >= active.len().saturating_sub(1) || (last_player_finished && passed_count >= active.len())
    }

    fn clear_field(&mut self) {
        self.state.reset_for_new_round();
        for player in &mut self.players {
            player.reset_turn_state();
        }
        if let Some(last_player) = self.state.last_player {
            if self.players[last_player as usize].finished_this_game {
                self.state.current_player = self.next_unfinished_after(last_player);
            } else {
                self.state.current_player = last_player;
            }
        }
        debug!(self.logger, "field cleared");
    }

    fn next_unfinished_after(&self, seat: u32) -> u32 {
        let num_players = self.players.len() as u32;
        let mut next = (seat + 1) % num_players;
        for _ in 0..num_players {
            if !self.players[next as usize].finished_this_game {
                return next;
            }
            next = (next + 1) % num_players;
        }
        seat
    }

    fn advance_player(&mut self) {
        self.state.current_player = self.next_unfinished_after(self.state.current_player);
    }

    /// Session points for a completed game's finish order: 5 for first
    /// place down to 1 for last.
    fn score_finish_order(finish_order: &[u32]) -> HashMap<u32, i32> {
        finish_order
            .iter()
            .enumerate()
            .map(|(position, &player_id)| (player_id, 5 - position as i32))
            .collect()
    }

    fn resolve_sennichite(&mut self, mut current_order: Vec<u32>) -> Vec<u32> {
        let mut remaining: Vec<u32> = self
            .players
            .iter()
            .map(|p| p.id)
            .filter(|id| !current_order.contains(id))
            .collect();
        remaining.shuffle(&mut self.rng);

        for id in remaining {
            current_order.push(id);
            self.players[id as usize].finished_this_game = true;
            self.players[id as usize].finish_position = Some(current_order.len() - 1);
        }
        current_order
    }

    fn build_state_table(&self, recipient: u32, hand: &Hand, phase: i32, exchange_count: i32) -> Table {
        let mut table = Table::new();
        table.set_held_cards(hand);

        let mut control = table.control();
        control.phase = phase;
        control.exchange_count = daifugo_wire::encode_exchange_count(exchange_count);
        control.current_player = self.state.current_player as i32;
        control.is_turn = recipient == self.state.current_player;
        control.onset = self.state.field.is_empty();
        control.eleven_back = self.state.is_eleven_back;
        control.revolution = self.state.is_revolution;
        control.lock = self.state.field.lock_active;
        table.set_control(&control);

        for (seat, player) in self.players.iter().enumerate() {
            table.set_hand_count(seat, self.hands[seat].len() as i32);
            table.set_class_rank(seat, player.class_rank as i32);
            table.set_seat_position(seat, player.seat as i32);
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daifugo_cards::{Rank, Suit};
    use daifugo_net::Connection;
    use std::net::{TcpListener, TcpStream};

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    /// Five loopback-connected players with no strategy behind the other
    /// end; fine for tests that never perform socket I/O through `Engine`.
    /// Keeps the peer end of every socket alive in the returned `Vec`.
    fn test_players() -> (Vec<Player>, Vec<TcpStream>) {
        let mut players = Vec::with_capacity(NUM_PLAYERS as usize);
        let mut peers = Vec::with_capacity(NUM_PLAYERS as usize);
        for id in 0..NUM_PLAYERS {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let peer = TcpStream::connect(addr).unwrap();
            let (server, _) = listener.accept().unwrap();
            peers.push(peer);
            players.push(Player::new(id, format!("Player{}", id), daifugo_wire::PROTOCOL_VERSION, id, Connection::new(server)));
        }
        (players, peers)
    }

    fn single(suit: Suit, rank: Rank) -> daifugo_wire::SubmittedCards {
        daifugo_wire::SubmittedCards {
            normal_cards: vec![Card::Normal(suit, rank)],
            joker_substitutes: None,
            joker_as_self: false,
        }
    }

    #[test]
    fn advance_player_moves_to_the_next_unfinished_seat() {
        let (players, _peers) = test_players();
        let mut engine = Engine::new(players, RuleFlags::default(), EventLog::disabled(), test_logger());
        engine.state.current_player = 2;
        engine.advance_player();
        assert_eq!(engine.state.current_player, 3);
    }

    #[test]
    fn advance_player_skips_finished_seats() {
        let (players, _peers) = test_players();
        let mut engine = Engine::new(players, RuleFlags::default(), EventLog::disabled(), test_logger());
        engine.players[3].finished_this_game = true;
        engine.state.current_player = 2;
        engine.advance_player();
        assert_eq!(engine.state.current_player, 4);
    }

    #[test]
    fn eight_cut_clears_the_field() {
        let (players, _peers) = test_players();
        let rules = RuleFlags::default();
        let mut engine = Engine::new(players, rules, EventLog::disabled(), test_logger());

        let filler = single(Suit::Spade, Rank::Four);
        let filler_analysis = CardAnalyzer::analyze(&filler, false);
        engine.process_valid_move(0, &filler, &filler_analysis).unwrap();
        assert!(!engine.state.field.is_empty());

        let eight = single(Suit::Heart, Rank::Eight);
        let eight_analysis = CardAnalyzer::analyze(&eight, false);
        engine.process_valid_move(1, &eight, &eight_analysis).unwrap();

        assert!(engine.state.field.is_empty());
    }

    #[test]
    fn lock_logs_only_on_the_transition_to_locked() {
        let (players, _peers) = test_players();
        let path = std::env::temp_dir().join("daifugo_engine_test_lock_transition.jsonl");
        std::fs::remove_file(&path).ok();
        {
            let log = EventLog::open(&path).unwrap();
            let mut engine = Engine::new(players, RuleFlags::default(), log, test_logger());

            for (player_id, rank) in [(0u32, Rank::Four), (1, Rank::Five), (2, Rank::Six)] {
                let submitted = single(Suit::Spade, rank);
                let analysis = CardAnalyzer::analyze(&submitted, false);
                engine.process_valid_move(player_id, &submitted, &analysis).unwrap();
            }
            assert!(engine.state.field.lock_active);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lock_events = contents.matches("\"event\":\"lock\"").count();
        std::fs::remove_file(&path).ok();
        assert_eq!(lock_events, 1);
    }

    #[test]
    fn lock_resets_when_a_different_suit_pattern_is_played() {
        let (players, _peers) = test_players();
        let mut engine = Engine::new(players, RuleFlags::default(), EventLog::disabled(), test_logger());

        for (player_id, rank) in [(0u32, Rank::Four), (1, Rank::Five)] {
            let submitted = single(Suit::Spade, rank);
            let analysis = CardAnalyzer::analyze(&submitted, false);
            engine.process_valid_move(player_id, &submitted, &analysis).unwrap();
        }
        assert!(engine.state.field.lock_active);

        let different_suit = single(Suit::Heart, Rank::Six);
        let analysis = CardAnalyzer::analyze(&different_suit, false);
        engine.process_valid_move(2, &different_suit, &analysis).unwrap();
        assert!(!engine.state.field.lock_active);
    }

    #[test]
    fn resolve_sennichite_fills_every_remaining_seat() {
        let (players, _peers) = test_players();
        let mut engine = Engine::new(players, RuleFlags::default(), EventLog::disabled(), test_logger());
        engine.players[0].finished_this_game = true;
        engine.players[0].finish_position = Some(0);

        let resolved = engine.resolve_sennichite(vec![0]);

        assert_eq!(resolved.len(), NUM_PLAYERS as usize);
        assert!(engine.players.iter().all(|p| p.finished_this_game));
        let mut sorted = resolved.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn score_finish_order_awards_five_down_to_one() {
        let scores = Engine::score_finish_order(&[2, 0, 4, 1, 3]);
        assert_eq!(scores[&2], 5);
        assert_eq!(scores[&0], 4);
        assert_eq!(scores[&4], 3);
        assert_eq!(scores[&1], 2);
        assert_eq!(scores[&3], 1);
    }
}
