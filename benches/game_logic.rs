use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blockfall::core::{
    try_rotate, Board, Catalog, InputFrame, MemoryHighscores, Session, SessionOptions,
};
use blockfall::types::{InputAction, Rgb, RotationDirection, SessionState};

fn playing_session() -> Session<MemoryHighscores> {
    let options = SessionOptions {
        seed: 12345,
        ..SessionOptions::default()
    };
    let mut session = Session::new(Catalog::standard().unwrap(), MemoryHighscores::new(), options);
    session.start_game(1);
    session
}

fn bench_tick(c: &mut Criterion) {
    let mut session = playing_session();
    let idle = InputFrame::idle();

    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            session.tick(&idle, black_box(16));
            session.take_events();
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut session = playing_session();
    let drop = InputFrame::pressing(InputAction::HardDrop);

    c.bench_function("hard_drop_tick", |b| {
        b.iter(|| {
            session.tick(&drop, black_box(16));
            if session.state() != SessionState::Playing {
                session.start_game(1);
            }
            session.take_events();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    let gray = Rgb::new(90, 90, 90);
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, Some(gray));
                }
            }
            board.clear_completed_lines()
        })
    });
}

fn bench_collision(c: &mut Criterion) {
    let session = playing_session();
    let board = Board::new();

    c.bench_function("collision_check", |b| {
        b.iter(|| board.is_collision(black_box(session.current())))
    });
}

fn bench_rotate(c: &mut Criterion) {
    let session = playing_session();
    let board = Board::new();
    let mut piece = session.current().clone();
    piece.translate(0, 8);

    c.bench_function("try_rotate", |b| {
        b.iter(|| try_rotate(&board, &mut piece, black_box(RotationDirection::Clockwise)))
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_hard_drop,
    bench_line_clear,
    bench_collision,
    bench_rotate
);
criterion_main!(benches);
