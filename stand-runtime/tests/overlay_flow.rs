//! # 立绘系统集成测试
//!
//! 测试 配置 → Overlay → Renderer 的完整链路。
//! 使用 RecordingRenderer 和 MemoryGameState，不依赖真实的渲染设备。

use stand_runtime::{
    ImageSize, LoadError, MemoryGameState, Overlay, OverlayConfig, RecordingRenderer, RenderCall,
    RenderTarget, SlotId, SlotPhase, Tone,
};

const CONFIG: &str = r#"{
    "transition": 1,
    "transition2": 3,
    "pictures": [
        { "id": 1, "imageName": "alice_smile" },
        { "id": 2, "imageName": "alice_angry" },
        { "id": 3, "imageName": "bob", "x2": 700, "reverse": -1, "origin": 1 }
    ],
    "patterns": [
        {
            "actorId": 1, "picture": "hero_hurt", "pictureId": 10,
            "conditions": [{ "kind": "hp-percentage", "lte": 30 }]
        },
        {
            "actorId": 1, "picture": "hero_calm", "pictureId": 10,
            "conditions": [{ "kind": "state" }]
        },
        {
            "actorId": 1, "picture": "hero_poison", "pictureId": 11,
            "conditions": [{ "kind": "state", "targetState": 4 }]
        }
    ]
}"#;

const SIZE: ImageSize = ImageSize {
    width: 300,
    height: 600,
};

fn overlay() -> Overlay {
    let config = OverlayConfig::from_json_str(CONFIG).unwrap();
    config.validate().unwrap();
    config.build()
}

/// 模拟宿主：把本帧发出的加载请求全部完成
fn complete_loads(overlay: &mut Overlay, renderer: &mut RecordingRenderer) {
    let loads: Vec<_> = renderer
        .calls
        .iter()
        .filter_map(|call| match call {
            RenderCall::Load { target, image } => Some((*target, image.clone())),
            _ => None,
        })
        .collect();
    renderer.calls.clear();
    for (target, image) in loads {
        overlay.on_image_loaded(target, &image, Ok(SIZE), renderer);
    }
}

fn run_frames(
    overlay: &mut Overlay,
    state: &MemoryGameState,
    renderer: &mut RecordingRenderer,
    frames: usize,
) {
    for _ in 0..frames {
        overlay.on_frame_tick(state, renderer);
    }
}

/// 测试基本的对话流程：显示、换图、聚焦、关闭窗口
#[test]
fn test_dialogue_flow() {
    let mut overlay = overlay();
    let mut renderer = RecordingRenderer::new();
    let state = MemoryGameState::new();

    // 1. 显示立绘 1
    let text = overlay.on_message_start(r"\F[1]\M[yes]你好。", &mut renderer);
    assert_eq!(text, "你好。");
    complete_loads(&mut overlay, &mut renderer);
    run_frames(&mut overlay, &state, &mut renderer, 15);
    let primary = overlay.dialogue().slot(SlotId::Primary);
    assert_eq!(primary.phase(), SlotPhase::Showing);
    assert_eq!(primary.opacity(), 255.0);

    // 2. 换成另一张图：先擦除旧图
    renderer.take();
    overlay.on_message_start(r"\F[2]……", &mut renderer);
    assert_eq!(
        renderer.calls[0],
        RenderCall::Erase {
            target: RenderTarget::Slot(SlotId::Primary)
        }
    );
    complete_loads(&mut overlay, &mut renderer);
    run_frames(&mut overlay, &state, &mut renderer, 1);
    assert_eq!(
        overlay.dialogue().slot(SlotId::Primary).opacity(),
        255.0
    );

    // 3. 两张立绘同时显示，聚焦立绘 2
    overlay.on_message_start(r"\F[2]\FF[3]\AA[2]", &mut renderer);
    complete_loads(&mut overlay, &mut renderer);
    run_frames(&mut overlay, &state, &mut renderer, 20);
    assert_eq!(
        renderer.last_tone(RenderTarget::Slot(SlotId::Primary)),
        Some(Tone::NEUTRAL.offset_rgb(-96))
    );
    let secondary = overlay.dialogue().slot(SlotId::Secondary);
    assert_eq!(secondary.phase(), SlotPhase::Showing);
    // 中心原点 + 翻转：700 - (300 * -100 / 100 / 2)
    assert_eq!(secondary.position(), (850.0, 96.0 - 300.0));

    // 4. 关闭窗口：两张立绘淡出
    overlay.on_message_window_closed();
    run_frames(&mut overlay, &state, &mut renderer, 15);
    assert_eq!(
        overlay.dialogue().slot(SlotId::Primary).phase(),
        SlotPhase::Idle
    );
    assert_eq!(
        overlay.dialogue().slot(SlotId::Secondary).phase(),
        SlotPhase::Idle
    );
    // 右侧浮出：退场后停在静止位置右侧 30 像素
    assert_eq!(
        overlay.dialogue().slot(SlotId::Secondary).position(),
        (880.0, -204.0)
    );
}

/// 测试图片加载失败不会打断对话
#[test]
fn test_asset_load_failure_is_absorbed() {
    let mut overlay = overlay();
    let mut renderer = RecordingRenderer::new();
    let state = MemoryGameState::new();

    let text = overlay.on_message_start(r"\F[1]\M[jumploop]台词", &mut renderer);
    assert_eq!(text, "台词");
    let consumed = overlay.on_image_loaded(
        RenderTarget::Slot(SlotId::Primary),
        "alice_smile",
        Err(LoadError::NotFound {
            image: "alice_smile".to_string(),
        }),
        &mut renderer,
    );
    assert!(consumed);

    run_frames(&mut overlay, &state, &mut renderer, 3);
    let primary = overlay.dialogue().slot(SlotId::Primary);
    assert_eq!(primary.phase(), SlotPhase::Idle);
    assert_eq!(primary.state().motion_counter, 0);
    assert_eq!(renderer.show_count(), 0);
}

/// 测试同一张图重新加载期间关闭窗口：屏幕上的旧图照常淡出
#[test]
fn test_window_closed_during_reload() {
    let mut overlay = overlay();
    let mut renderer = RecordingRenderer::new();
    let state = MemoryGameState::new();
    let target = RenderTarget::Slot(SlotId::Primary);

    overlay.on_message_start(r"\F[1]", &mut renderer);
    complete_loads(&mut overlay, &mut renderer);
    run_frames(&mut overlay, &state, &mut renderer, 15);
    assert_eq!(renderer.last_placement(target).unwrap().opacity, 255);

    // 加载回报之前窗口就关闭了
    overlay.on_message_start(r"\F[1]再见。", &mut renderer);
    overlay.on_message_window_closed();
    run_frames(&mut overlay, &state, &mut renderer, 15);
    assert_eq!(
        overlay.dialogue().slot(SlotId::Primary).phase(),
        SlotPhase::Idle
    );
    assert_eq!(renderer.last_placement(target).unwrap().opacity, 0);

    // 迟到的加载结果不再显示
    complete_loads(&mut overlay, &mut renderer);
    run_frames(&mut overlay, &state, &mut renderer, 1);
    assert_eq!(renderer.show_count(), 0);
    assert!(renderer.last_placement(target).is_none());
}

/// 测试战斗立绘：模式切换、兜底与结束清理
#[test]
fn test_battle_flow() {
    let mut overlay = overlay();
    let mut renderer = RecordingRenderer::new();
    let mut state = MemoryGameState::new();
    state.set_hp(1, 100, 100);
    state.add_state(1, 9);

    // 只带有未被引用的状态 9：无目标状态条件成立
    overlay.on_battle_start(&[1], &state, &mut renderer);
    assert_eq!(
        overlay.battle().registry().shown(1).unwrap().image,
        "hero_calm"
    );

    // 状态不变时不重复下发
    renderer.take();
    run_frames(&mut overlay, &state, &mut renderer, 30);
    assert!(renderer.calls.is_empty());

    // 中毒：换到另一图片编号，先擦除旧图
    state.add_state(1, 4);
    run_frames(&mut overlay, &state, &mut renderer, 1);
    let calls = renderer.take();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        RenderCall::Erase {
            target: RenderTarget::Picture(10)
        }
    );
    assert_eq!(calls[1].target(), RenderTarget::Picture(11));

    // HP 降低：第一个模式胜出
    state.set_hp(1, 25, 100);
    run_frames(&mut overlay, &state, &mut renderer, 1);
    assert_eq!(
        overlay.battle().registry().shown(1).unwrap().image,
        "hero_hurt"
    );

    overlay.on_battle_end(&mut renderer);
    assert!(overlay.battle().registry().is_empty());
    assert_eq!(
        renderer.calls.last(),
        Some(&RenderCall::Erase {
            target: RenderTarget::Picture(10)
        })
    );
}

/// 测试禁用立绘显示
#[test]
fn test_disable_and_reenable() {
    let mut overlay = overlay();
    let mut renderer = RecordingRenderer::new();
    let state = MemoryGameState::new();

    overlay.on_message_start(r"\F[1]", &mut renderer);
    complete_loads(&mut overlay, &mut renderer);
    overlay.set_enabled(false);
    run_frames(&mut overlay, &state, &mut renderer, 30);
    assert_eq!(overlay.dialogue().slot(SlotId::Primary).opacity(), 0.0);

    overlay.set_enabled(true);
    run_frames(&mut overlay, &state, &mut renderer, 15);
    assert_eq!(overlay.dialogue().slot(SlotId::Primary).opacity(), 255.0);
}
