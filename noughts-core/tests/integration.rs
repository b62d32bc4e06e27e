//! Integration tests: rendezvous, full games, restarts and error
//! scenarios over real TCP connections on localhost.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use noughts_core::{
    Board, GameOutcome, GameSession, Mark, Move, MoveChannel, NoughtsError, Phase, Rendezvous,
    RendezvousConfig, Role, SessionEvent,
};
use tokio::net::{TcpListener, TcpStream};

// ── Helpers ──────────────────────────────────────────────────────

fn local_config() -> RendezvousConfig {
    RendezvousConfig {
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        retry_interval_ms: 20,
        connect_timeout_ms: 200,
        deadline_ms: Some(5_000),
    }
}

/// A localhost port that was free a moment ago.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Spin up a listener on an OS-assigned port.
async fn ephemeral_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// A Peer/Host session pair over a real TCP connection.
async fn session_pair() -> (GameSession, GameSession) {
    let (listener, addr) = ephemeral_listener().await;
    let connect = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (accepted, _) = listener.accept().await.unwrap();
    let connected = connect.await.unwrap();

    let peer = GameSession::start(MoveChannel::new(connected), Role::Peer);
    let host = GameSession::start(MoveChannel::new(accepted), Role::Host);
    (peer, host)
}

async fn next(session: &mut GameSession) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), session.next_event())
        .await
        .expect("timeout")
        .expect("session stopped")
}

/// Wait until it is this side's turn and return the board.
async fn wait_my_turn(session: &mut GameSession) -> Board {
    loop {
        if let SessionEvent::Board {
            board,
            my_turn: true,
        } = next(session).await
        {
            return board;
        }
    }
}

async fn wait_game_over(session: &mut GameSession) -> GameOutcome {
    loop {
        if let SessionEvent::GameOver(outcome) = next(session).await {
            return outcome;
        }
    }
}

/// Play `moves` alternately, starting with `first`.
async fn play(first: &mut GameSession, second: &mut GameSession, moves: &[u8]) {
    for (i, &cell) in moves.iter().enumerate() {
        let side = if i % 2 == 0 { &mut *first } else { &mut *second };
        wait_my_turn(side).await;
        side.handle().request_local_move(cell).unwrap();
    }
}

// ── Rendezvous ───────────────────────────────────────────────────

/// This machine's address on its default route, if it has one.
fn own_lan_ip() -> Option<IpAddr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.0.2.1:9").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

#[tokio::test]
async fn test_rendezvous_assigns_complementary_roles() {
    let port = free_port();
    let target = SocketAddr::from(([127, 0, 0, 1], port));

    let first = tokio::spawn(async move {
        Rendezvous::new(target, local_config()).negotiate().await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = tokio::spawn(async move {
        Rendezvous::new(target, local_config()).negotiate().await
    });

    let (mut a, role_a) = first.await.unwrap().unwrap();
    let (mut b, role_b) = second.await.unwrap().unwrap();
    assert_eq!(role_a, Role::Host);
    assert_eq!(role_b, Role::Peer);

    // The link works both ways.
    b.send(Move::new(4).unwrap()).await.unwrap();
    assert_eq!(a.receive().await.unwrap().cell(), 4);
    a.send(Move::new(0).unwrap()).await.unwrap();
    assert_eq!(b.receive().await.unwrap().cell(), 0);
}

#[tokio::test]
async fn test_rendezvous_on_own_interface_address() {
    // Both copies started on one machine, naming it by its LAN address.
    let Some(own) = own_lan_ip() else {
        return;
    };
    let port = free_port();
    let target = SocketAddr::new(own, port);
    let config = || RendezvousConfig {
        bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        ..local_config()
    };

    let first = tokio::spawn(async move { Rendezvous::new(target, config()).negotiate().await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = tokio::spawn(async move { Rendezvous::new(target, config()).negotiate().await });

    let (mut a, role_a) = first.await.unwrap().unwrap();
    let (mut b, role_b) = second.await.unwrap().unwrap();
    assert_eq!(role_a, Role::Host);
    assert_eq!(role_b, Role::Peer);

    b.send(Move::new(2).unwrap()).await.unwrap();
    assert_eq!(a.receive().await.unwrap().cell(), 2);
}

#[tokio::test]
async fn test_rendezvous_start_order_does_not_matter() {
    let port = free_port();

    // Both start together; exactly one ends up as each role.
    let (a, b) = tokio::join!(
        Rendezvous::resolve("127.0.0.1", port, local_config()),
        Rendezvous::resolve("127.0.0.1", port, local_config()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    let (ra, rb) = tokio::join!(a.negotiate(), b.negotiate());
    let (_, role_a) = ra.unwrap();
    let (_, role_b) = rb.unwrap();
    assert_eq!(role_a, role_b.opposite());
}

#[tokio::test]
async fn test_connect_builds_sessions() {
    let port = free_port();
    let (a, b) = tokio::join!(
        GameSession::connect("127.0.0.1", port, local_config()),
        GameSession::connect("127.0.0.1", port, local_config()),
    );
    let (mut a, mut b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.role(), b.role().opposite());

    let SessionEvent::Started { role } = next(&mut a).await else {
        panic!("first event must be Started");
    };
    assert_eq!(role, a.role());
    assert!(matches!(next(&mut b).await, SessionEvent::Started { .. }));
}

#[tokio::test]
async fn test_low_port_is_startup_error() {
    let err = GameSession::connect("127.0.0.1", 4999, local_config())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, NoughtsError::InvalidPort { port: 4999, .. }));
    assert_eq!(err.phase(), Phase::Startup);
}

// ── Games ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_host_wins_left_column() {
    let (mut peer, mut host) = session_pair().await;

    play(&mut peer, &mut host, &[4, 0, 1, 3, 8, 6]).await;

    assert_eq!(wait_game_over(&mut host).await, GameOutcome::Win(Mark::Mine));
    assert_eq!(
        wait_game_over(&mut peer).await,
        GameOutcome::Win(Mark::Theirs)
    );
}

#[tokio::test]
async fn test_full_board_is_draw() {
    let (mut peer, mut host) = session_pair().await;

    play(&mut peer, &mut host, &[0, 4, 8, 1, 7, 6, 2, 5, 3]).await;

    assert_eq!(wait_game_over(&mut peer).await, GameOutcome::Draw);
    assert_eq!(wait_game_over(&mut host).await, GameOutcome::Draw);
}

#[tokio::test]
async fn test_boards_mirror_each_other() {
    let (mut peer, mut host) = session_pair().await;

    play(&mut peer, &mut host, &[4, 0]).await;
    let peer_board = wait_my_turn(&mut peer).await;
    assert_eq!(peer_board.cell(4), Some(Mark::Mine));
    assert_eq!(peer_board.cell(0), Some(Mark::Theirs));

    peer.handle().request_local_move(8).unwrap();
    let host_board = wait_my_turn(&mut host).await;
    assert_eq!(host_board.cell(4), Some(Mark::Theirs));
    assert_eq!(host_board.cell(0), Some(Mark::Mine));
    assert_eq!(host_board.cell(8), Some(Mark::Theirs));
}

#[tokio::test]
async fn test_restart_gives_first_move_back_to_peer() {
    let (mut peer, mut host) = session_pair().await;

    play(&mut peer, &mut host, &[4, 0, 1, 3, 8, 6]).await;
    wait_game_over(&mut peer).await;
    wait_game_over(&mut host).await;

    host.handle().restart().unwrap();
    peer.handle().restart().unwrap();

    // Second game, same roles: Peer opens.
    let board = wait_my_turn(&mut peer).await;
    assert_eq!(board, Board::new());
    peer.handle().request_local_move(0).unwrap();
    play(&mut host, &mut peer, &[3, 1, 4, 2]).await;
    assert_eq!(wait_game_over(&mut peer).await, GameOutcome::Win(Mark::Mine));
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_duplicate_remote_move_is_fatal() {
    let (listener, addr) = ephemeral_listener().await;
    let raw = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (accepted, _) = listener.accept().await.unwrap();
    let mut peer = MoveChannel::new(raw.await.unwrap());
    let mut host = GameSession::start(MoveChannel::new(accepted), Role::Host);

    peer.send(Move::new(4).unwrap()).await.unwrap();
    wait_my_turn(&mut host).await;
    host.handle().request_local_move(0).unwrap();
    assert_eq!(peer.receive().await.unwrap().cell(), 0);

    // Cell 0 is already marked on both boards.
    peer.send(Move::new(0).unwrap()).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), host.join())
        .await
        .expect("timeout")
        .unwrap_err();
    assert!(err.is_protocol_violation());
    assert_eq!(err.phase(), Phase::InGame);
}

#[tokio::test]
async fn test_quit_closes_link_for_counterpart() {
    let (mut peer, host) = session_pair().await;
    wait_my_turn(&mut peer).await;

    host.handle().quit().unwrap();
    tokio::time::timeout(Duration::from_secs(5), host.join())
        .await
        .expect("timeout")
        .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), peer.join())
        .await
        .expect("timeout")
        .unwrap_err();
    assert!(matches!(err, NoughtsError::LinkClosed));
}
