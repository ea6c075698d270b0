mod common;

use roulette::config::GameConfig;
use roulette::console::Console;
use roulette::game::{ScriptedRng, ShellRng, ShuffleOrder};
use std::io::Cursor;

fn game_config() -> GameConfig {
    GameConfig {
        default_lives: 3,
        default_players: 2,
        dealer_name: "Dealer".to_string(),
        seed: None,
    }
}

/// Run the console over `input` with every game using a clone of `rng`.
async fn run_console(input: &str, rng: ScriptedRng) -> (tempfile::TempDir, String) {
    let (tmp, storage) = common::temp_storage().await;
    let mut console = Console::new(Cursor::new(input.to_string()), Vec::new(), storage, game_config())
        .with_rng_factory(Box::new(move || Box::new(rng.clone()) as Box<dyn ShellRng>));
    console.run().await.expect("console run");
    let out = String::from_utf8(console.into_output()).expect("utf8 output");
    (tmp, out)
}

#[tokio::test]
async fn play_requires_login() {
    let (_tmp, out) = run_console("1\n5\n", ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Please log in first."), "{}", out);
    assert!(out.contains("Goodbye!"));
}

#[tokio::test]
async fn invalid_menu_option_is_reported() {
    let (_tmp, out) = run_console("9\n5\n", ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Invalid option"), "{}", out);
}

#[tokio::test]
async fn end_of_input_leaves_quietly() {
    let (_tmp, out) = run_console("", ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Main Menu"));
    assert!(!out.contains("Goodbye!"));
}

#[tokio::test]
async fn sign_up_win_and_scoreboard() {
    let input = "4\nalice\nsecret123\nsecret123\n1\n1\n1\nd\nn\n2\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![1])).await;
    assert!(out.contains("You are now logged in as alice."), "{}", out);
    assert!(out.contains("🔴 Live shell(s): 1, 🔵 Blank shell(s): 5"), "{}", out);
    assert!(out.contains("Winner: alice"), "{}", out);
    assert!(out.contains("Final score: 300"), "{}", out);
    assert!(out.contains("New high score!"), "{}", out);
    assert!(out.contains("1. alice: 300"), "{}", out);
}

#[tokio::test]
async fn loss_ends_without_continue_prompt() {
    let input = "4\nbob\nsecret123\nsecret123\n1\n1\n1\ns\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Final score: 0"), "{}", out);
    assert!(out.contains("You lost all your lives."), "{}", out);
    assert!(!out.contains("Continue playing?"), "{}", out);
}

#[tokio::test]
async fn continue_restarts_with_full_lives() {
    // Each game: the dealer is hit once, then shoots itself on its last life.
    let input = "4\ncara\nsecret123\nsecret123\n1\n1\n2\nd\ny\nd\nn\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![5])).await;
    assert!(out.contains("Lives restored."), "{}", out);
    assert_eq!(out.matches("Winner: cara").count(), 2, "{}", out);
    // 1 round on 2 lives both times: 1 x 200
    assert_eq!(out.matches("Final score: 200").count(), 2, "{}", out);
    assert!(out.contains("New high score!"), "{}", out);
    assert!(out.contains("Best score: 200"), "{}", out);
}

#[tokio::test]
async fn dealer_plays_coin_flip_turns() {
    let rng = ScriptedRng::new(vec![1])
        .with_order(ShuffleOrder::BlankFirst)
        .with_coin_flips(vec![true, false]);
    let input = "4\ndora\nsecret123\nsecret123\n1\n1\n1\nd\nd\n5\n";
    let (_tmp, out) = run_console(input, rng).await;
    assert!(out.contains("Dealer shoots themselves."), "{}", out);
    assert!(out.contains("Dealer shoots dora."), "{}", out);
    assert!(out.contains("dora is out of the game!"), "{}", out);
    assert!(out.contains("Winner: Dealer"), "{}", out);
}

#[tokio::test]
async fn lives_out_of_range_are_clamped() {
    let input = "4\neve\nsecret123\nsecret123\n1\n1\n9\ns\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Lives must be between 1 and 5; using 1."), "{}", out);
    assert!(out.contains("You lost all your lives."), "{}", out);
}

#[tokio::test]
async fn multiplayer_three_way() {
    let input = "4\nhost\nsecret123\nsecret123\n1\n2\n3\nA\nB\nC\n1\n2\n2\n2\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![5])).await;
    assert!(out.contains("A shoots B."), "{}", out);
    assert!(out.contains("B is out of the game!"), "{}", out);
    assert!(out.contains("C shoots A."), "{}", out);
    assert!(out.contains("Winner: C"), "{}", out);
    assert!(!out.contains("Final score"), "{}", out);
}

#[tokio::test]
async fn multiplayer_clamps_count_and_names_blank_seats() {
    let input = "4\nhost\nsecret123\nsecret123\n1\n2\n7\n\n\n1\n2\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Players must be between 2 and 4; using 2."), "{}", out);
    assert!(out.contains("Player 1 shoots Player 2."), "{}", out);
    assert!(out.contains("Winner: Player 1"), "{}", out);
}

#[tokio::test]
async fn bad_login_then_good_login() {
    let (tmp, mut storage) = common::temp_storage().await;
    storage.register_user("frank", "rightpass1").await.unwrap();
    let input = "3\nfrank\nwrongpass\n3\nfrank\nrightpass1\n5\n";
    let mut console = Console::new(Cursor::new(input.to_string()), Vec::new(), storage, game_config());
    console.run().await.unwrap();
    assert_eq!(console.user(), Some("frank"));
    let out = String::from_utf8(console.into_output()).unwrap();
    assert!(out.contains("Invalid username or password."), "{}", out);
    assert!(out.contains("Welcome back, frank!"), "{}", out);
    drop(tmp);
}

#[tokio::test]
async fn mismatched_sign_up_passwords() {
    let input = "4\ngreg\nsecret123\nsecret124\n1\n5\n";
    let (_tmp, out) = run_console(input, ScriptedRng::new(vec![1])).await;
    assert!(out.contains("Passwords do not match."), "{}", out);
    assert!(out.contains("Please log in first."), "{}", out);
}

#[tokio::test]
async fn passwords_go_through_the_secret_reader() {
    let (_tmp, storage) = common::temp_storage().await;
    let mut secrets: std::collections::VecDeque<&'static str> =
        ["hidden123", "hidden123", "hidden123"].into_iter().collect();
    let input = "4\nhana\n3\nhana\n5\n";
    let mut console = Console::new(Cursor::new(input.to_string()), Vec::new(), storage, game_config())
        .with_secret_reader(Box::new(move |_prompt: &str| {
            secrets
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
        }));
    console.run().await.unwrap();
    assert_eq!(console.user(), Some("hana"));
    let out = String::from_utf8(console.into_output()).unwrap();
    assert!(out.contains("You are now logged in as hana."), "{}", out);
    assert!(out.contains("Welcome back, hana!"), "{}", out);
    assert!(out.contains("Goodbye!"), "{}", out);
    assert!(!out.contains("hidden123"), "{}", out);
}
