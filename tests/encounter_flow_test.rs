use clap::Parser;
use dm_toolkit::domain::encounter::Encounter;
use dm_toolkit::{App, AppConfig, CliConfig, DmError, LocalStorage};
use tempfile::TempDir;

fn app(dir: &TempDir) -> App<LocalStorage> {
    App::new(AppConfig::default(), LocalStorage::new(dir.path()))
}

async fn run(app: &App<LocalStorage>, args: &[&str]) -> dm_toolkit::Result<String> {
    let cli = CliConfig::try_parse_from(std::iter::once("dm-toolkit").chain(args.iter().copied()))
        .unwrap();
    app.execute(cli.command).await
}

fn current_on_disk(dir: &TempDir) -> Encounter {
    let raw = std::fs::read_to_string(dir.path().join("current_encounter.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_full_combat_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let out = run(&app, &["encounter", "new", "Goblin Ambush"]).await.unwrap();
    assert!(out.contains("Started encounter: Goblin Ambush"));

    let out = run(&app, &["encounter", "add", "--monster", "goblin"]).await.unwrap();
    assert!(out.contains("Added Goblin to encounter!"));
    assert!(out.contains("HP 7/7"));

    run(
        &app,
        &["encounter", "add", "--name", "Aria", "--hp", "24", "--ac", "16", "--init-mod", "-1", "--player"],
    )
    .await
    .unwrap();

    let out = run(&app, &["encounter", "quick-add", "Wolf, 11, 13, 2", "not a creature"])
        .await
        .unwrap();
    assert!(out.contains("Added 1 creatures!"));
    assert!(out.contains("Could not parse: not a creature"));

    // 先調整 HP 與狀態，順序尚未被擲骰打亂
    let out = run(&app, &["encounter", "damage", "1", "4"]).await.unwrap();
    assert!(out.contains("Goblin takes 4 damage"));
    assert!(out.contains("Goblin (Bloodied)"));

    run(&app, &["encounter", "condition", "3", "--add", "prone", "--add", "frightened"])
        .await
        .unwrap();
    run(&app, &["encounter", "heal", "2", "100"]).await.unwrap();

    let saved = current_on_disk(&dir);
    assert_eq!(saved.creatures.len(), 3);
    assert_eq!(saved.creatures[0].current_hp, 3);
    assert_eq!(saved.creatures[1].initiative_modifier, -1);
    assert!(saved.creatures[1].is_player);
    assert_eq!(saved.creatures[1].current_hp, 24);
    assert_eq!(saved.creatures[2].conditions, vec!["Prone", "Frightened"]);

    let out = run(&app, &["encounter", "roll"]).await.unwrap();
    assert!(out.contains("Rolled initiative"));
    assert!(out.contains("Current Turn:"));
    assert!(out.contains("▶ #1"));

    let rolled = current_on_disk(&dir);
    assert!(rolled.is_active);
    for pair in rolled.creatures.windows(2) {
        assert!(pair[0].initiative >= pair[1].initiative);
    }

    run(&app, &["encounter", "next"]).await.unwrap();
    run(&app, &["encounter", "next"]).await.unwrap();
    let out = run(&app, &["encounter", "next"]).await.unwrap();
    assert!(out.contains("Round 2:"));

    let out = run(&app, &["encounter", "prev"]).await.unwrap();
    assert!(out.contains("Round 1:"));

    let out = run(&app, &["encounter", "save"]).await.unwrap();
    assert!(out.contains("Saved encounter: Goblin Ambush"));

    run(&app, &["encounter", "new", "Scratch"]).await.unwrap();
    assert_eq!(current_on_disk(&dir).creatures.len(), 0);

    let out = run(&app, &["encounter", "list"]).await.unwrap();
    assert_eq!(out, "- Goblin Ambush");

    let out = run(&app, &["encounter", "load", "Goblin Ambush"]).await.unwrap();
    assert!(out.contains("Loaded encounter: Goblin Ambush"));
    assert_eq!(current_on_disk(&dir).creatures.len(), 3);
}

#[tokio::test]
async fn test_bad_positions_and_inputs() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    run(&app, &["encounter", "add", "--name", "Ogre", "--hp", "59", "--ac", "11"])
        .await
        .unwrap();

    assert!(matches!(
        run(&app, &["encounter", "damage", "0", "5"]).await,
        Err(DmError::ValidationError { .. })
    ));
    assert!(matches!(
        run(&app, &["encounter", "damage", "4", "5"]).await,
        Err(DmError::NotFound { .. })
    ));
    assert!(matches!(
        run(&app, &["encounter", "condition", "1", "--add", "sleepy"]).await,
        Err(DmError::ValidationError { .. })
    ));
    assert!(matches!(
        run(&app, &["encounter", "add", "--monster", "Tarrasque"]).await,
        Err(DmError::NotFound { .. })
    ));
    assert!(matches!(
        run(&app, &["encounter", "load", "Missing"]).await,
        Err(DmError::NotFound { .. })
    ));

    // 失敗的指令不應改動目前遭遇
    let current = current_on_disk(&dir);
    assert_eq!(current.creatures.len(), 1);
    assert_eq!(current.creatures[0].current_hp, 59);
    assert!(current.creatures[0].conditions.is_empty());
}

#[tokio::test]
async fn test_remove_and_reset() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    run(&app, &["encounter", "quick-add", "Orc, 15, 13, 1", "Orc Shaman, 15, 13"])
        .await
        .unwrap();
    run(&app, &["encounter", "roll"]).await.unwrap();
    run(&app, &["encounter", "next"]).await.unwrap();

    let out = run(&app, &["encounter", "remove", "9"]).await.unwrap();
    assert!(out.contains("No creature at #9"));

    let out = run(&app, &["encounter", "remove", "2"]).await.unwrap();
    assert!(out.contains("Removed"));

    let out = run(&app, &["encounter", "reset"]).await.unwrap();
    assert!(out.contains("Combat reset to round 1"));
    let current = current_on_disk(&dir);
    assert_eq!(current.creatures.len(), 1);
    assert_eq!(current.round_number, 1);
    assert_eq!(current.current_turn_index, 0);
    assert!(!current.is_active);
}

#[tokio::test]
async fn test_dice_and_monsters() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let out = run(&app, &["dice", "2d6+3", "--times", "3"]).await.unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("🎲 2d6+3"));
    assert_eq!(lines[3], "range 5..=15, average 10.0");

    assert!(matches!(
        run(&app, &["dice", "banana"]).await,
        Err(DmError::DiceParseError { .. })
    ));
    assert!(run(&app, &["dice", "1d20", "--times", "0"]).await.is_err());

    let out = run(&app, &["monsters", "--search", "wolf"]).await.unwrap();
    assert!(out.contains("Wolf"));
    assert!(out.contains("Dire Wolf"));
    assert!(!out.contains("Goblin"));
}

#[tokio::test]
async fn test_custom_monster_file_in_data_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("srd_monsters.json"),
        r#"[{"name": "Kobold Sorcerer", "hp": 12, "ac": 12, "initiative_modifier": 3}]"#,
    )
    .unwrap();
    let app = app(&dir);

    let out = run(&app, &["monsters"]).await.unwrap();
    assert!(out.contains("Kobold Sorcerer"));
    assert!(!out.contains("Goblin"));

    let out = run(&app, &["encounter", "add", "--monster", "kobold sorcerer", "--hp", "20"])
        .await
        .unwrap();
    assert!(out.contains("HP 20/20"));
    assert!(out.contains("AC 12 | HP"));
}

#[tokio::test]
async fn test_read_only_commands_leave_no_working_file() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let out = run(&app, &["encounter", "show"]).await.unwrap();
    assert!(out.contains("No creatures in encounter"));
    let out = run(&app, &["encounter", "list"]).await.unwrap();
    assert_eq!(out, "No saved encounters yet.");
    assert!(!dir.path().join("current_encounter.json").exists());

    run(&app, &["encounter", "next"]).await.unwrap();
    assert!(dir.path().join("current_encounter.json").exists());
}
