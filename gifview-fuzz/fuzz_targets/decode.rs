// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;

use gifview::{Decoder, Player, compose};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = Decoder::new(data).max_image_sz(Some(1 << 16)).decode()
    else {
        return;
    };
    let screen = doc.screen();
    let area = usize::from(screen.screen_width())
        * usize::from(screen.screen_height());
    if area <= 1 << 16 {
        compose::render(&doc);
    }
    let mut player = Player::new(&doc);
    for delta in [0.0, 1.0, 7.5, 1000.0] {
        player.tick(delta);
    }
    player.previous_frame();
});
