//! Builds the wire-level `GameView` from a `TableAggregate`'s current state. Lives in
//! `poker-server` rather than `poker-core` because it's a presentation concern (seat numbers are
//! 1-indexed for clients, `PlayerId`s map straight through) over data the aggregate already
//! exposes publicly.
use poker_core::aggregate::TableAggregate;
use poker_core::player::PlayerFilter;
use poker_messages::view::{GameView, PotView, SeatView};

pub fn build_game_view(agg: &TableAggregate) -> GameView {
    let table = agg.table();
    let game = &table.game;

    let seats = game
        .players
        .players_iter(PlayerFilter::ALL)
        .map(|(seat_idx, player)| {
            let (current_bet, all_in, folded) = match player.bet_status {
                poker_core::BetStatus::Folded => (poker_core::Currency::ZERO, false, true),
                poker_core::BetStatus::Waiting => (poker_core::Currency::ZERO, false, false),
                poker_core::BetStatus::In(amount) => (amount, false, false),
                poker_core::BetStatus::AllIn(amount) => (amount, true, false),
            };
            SeatView {
                seat: (seat_idx + 1) as u8,
                player_id: player.id,
                chips: player.stack,
                current_bet,
                hole_cards: None,
                folded,
                all_in,
            }
        })
        .collect();

    let pots = game
        .pots_snapshot()
        .into_iter()
        .map(|(id, amount, eligible_players)| PotView { id, amount, eligible_players })
        .collect();

    GameView {
        table_id: table.id,
        table_type: table.table_type,
        state: game.state(),
        community_cards: game.community.iter().filter_map(|c| *c).collect(),
        pots,
        seats,
        action_seat: game.nta().map(|(seat_idx, _)| (seat_idx + 1) as u8),
    }
}

/// Same view, but with `seat`'s own hole cards revealed — used when publishing to that seat's
/// own connection rather than the public broadcast.
pub fn reveal_own_cards(mut view: GameView, agg: &TableAggregate, viewer_seat: u8) -> GameView {
    let table = agg.table();
    if let Some((seat_idx, player)) = table
        .game
        .players
        .players_iter(PlayerFilter::ALL)
        .find(|(seat_idx, _)| (*seat_idx + 1) as u8 == viewer_seat)
    {
        let _ = seat_idx;
        if let Some(seat_view) = view.seats.iter_mut().find(|s| s.seat == viewer_seat) {
            seat_view.hole_cards = player.pocket;
        }
    }
    view
}
