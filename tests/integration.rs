//! Testing fantasy8's public API end to end
use fantasy8::*;
use std::path::PathBuf;

/// `cls` then jump-to-self, forever
const CLS_LOOP: [u8; 4] = [0x00, 0xe0, 0x12, 0x02];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes `bytes` to a file unique to this test, and returns its path
fn temp_rom(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fantasy8-{}-{name}.ch8", std::process::id()));
    std::fs::write(&path, bytes).expect("temp dir should be writable");
    path
}

mod lifecycle {
    use super::*;

    #[test]
    fn cls_loop_runs_forever() {
        init_logger();
        let mut emu = Emulator::default();
        emu.load_program_bytes(&CLS_LOOP).unwrap();
        for _ in 0..10_000 {
            assert_eq!(State::Running, emu.step().unwrap());
        }
        assert_eq!(0x202, emu.cpu().pc());
        assert!(emu.screen().is_blank());
    }

    #[test]
    fn cls_then_jump_to_start() {
        init_logger();
        let mut emu = Emulator::default();
        // cls; jmp 0x200
        emu.load_program_bytes(&[0x00, 0xe0, 0x12, 0x00]).unwrap();
        for _ in 0..10_001 {
            assert_eq!(State::Running, emu.step().unwrap());
            assert!(matches!(emu.cpu().pc(), 0x200 | 0x202));
        }
        assert_eq!(0x202, emu.cpu().pc());
        assert!(emu.screen().is_blank());
    }

    #[test]
    fn load_reads_back() {
        let mut emu = Emulator::default();
        let rom: Vec<u8> = (0..=255).collect();
        emu.load_program_bytes(&rom).unwrap();
        assert_eq!(&rom[..], &emu.cpu().mem().as_slice()[0x200..0x300]);
        assert_eq!(0x200, emu.cpu().pc());
        // the glyphs are untouched
        assert_eq!(
            &fantasy8::cpu::mem::CHARSET,
            &emu.cpu().mem().as_slice()[0x000..0x050]
        );
    }

    #[test]
    fn load_largest_program() {
        let mut emu = Emulator::default();
        emu.load_program_bytes(&[0xaa; 0xe00]).unwrap();
        assert_eq!(0xaa, emu.cpu().mem().read(0xfff));
        assert!(matches!(
            emu.load_program_bytes(&[0xaa; 0xe01]),
            Err(Error::ProgramTooLarge { len: 0xe01, .. })
        ));
        // the rejected load leaves the last one running
        assert_eq!(State::Running, emu.state());
    }

    #[test]
    fn load_from_path() {
        init_logger();
        let path = temp_rom("load_from_path", &CLS_LOOP);
        let mut emu = Emulator::default();
        emu.load_program(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(State::Running, emu.state());
        assert_eq!(&CLS_LOOP, &emu.cpu().mem().as_slice()[0x200..0x204]);
    }

    #[test]
    fn missing_path() {
        let mut emu = Emulator::default();
        let path = std::env::temp_dir().join("fantasy8-this-file-does-not-exist.ch8");
        match emu.load_program(&path) {
            Err(Error::ProgramLoadFailure { path: p, .. }) => assert_eq!(path, p),
            other => panic!("expected load failure, got {other:?}"),
        }
        assert_eq!(State::Idle, emu.state());
    }

    #[test]
    fn unload() {
        let mut emu = Emulator::default();
        emu.load_program_bytes(&CLS_LOOP).unwrap();
        emu.unload();
        assert_eq!(State::Idle, emu.state());
        assert!(emu.cpu().mem().as_slice()[0x050..].iter().all(|&b| b == 0));
        assert!(matches!(emu.step(), Err(Error::NoProgramLoaded)));
    }
}

mod programs {
    use super::*;

    /// Draws the glyph for `digit` at (x, y) and then spins
    fn draw_digit(digit: u8, x: u8, y: u8) -> [u8; 12] {
        [
            0x60, digit, // mov digit, v0
            0xf0, 0x29, // font v0, I
            0x61, x, // mov x, v1
            0x62, y, // mov y, v2
            0xd1, 0x25, // draw #5, v1, v2
            0x12, 0x0a, // jmp 0x20a
        ]
    }

    #[test]
    fn draws_a_glyph() {
        let mut emu = Emulator::default();
        emu.load_program_bytes(&draw_digit(0x1, 0, 0)).unwrap();
        for _ in 0..5 {
            emu.step().unwrap();
        }
        // 1 is 20 60 20 20 70
        let screen = emu.screen();
        assert!(screen.get(2, 0) && screen.get(1, 1) && screen.get(2, 1));
        assert!((1..4).all(|x| screen.get(x, 4)));
        assert_eq!(0, emu.cpu().v()[0xf]);
    }

    #[test]
    fn subroutine_returns() {
        let mut emu = Emulator::default();
        #[rustfmt::skip]
        let rom = [
            0x22, 0x06, // call 0x206
            0x12, 0x02, // jmp 0x202
            0x00, 0x00, // padding
            0x6a, 0x42, // mov #42, vA
            0x00, 0xee, // ret
        ];
        emu.load_program_bytes(&rom).unwrap();
        for _ in 0..4 {
            emu.step().unwrap();
        }
        assert_eq!(0x42, emu.cpu().v()[0xa]);
        assert_eq!(0x202, emu.cpu().pc());
        assert_eq!(0, emu.cpu().sp());
    }

    #[test]
    fn skip_policy_is_selectable() {
        let program = [0x5a, 0xb1, 0x6a, 0x01];
        let mut halting = Emulator::default();
        halting.load_program_bytes(&program).unwrap();
        assert!(halting.step().is_err());
        assert_eq!(State::Halted, halting.state());

        let mut skipping = Emulator::new(
            Flags {
                on_invalid: InvalidPolicy::Skip,
                ..Default::default()
            },
            Rates::default(),
        );
        skipping.load_program_bytes(&program).unwrap();
        skipping.step().unwrap();
        skipping.step().unwrap();
        assert_eq!(1, skipping.cpu().v()[0xa]);
        assert_eq!(State::Running, skipping.state());
    }
}

mod run {
    use super::*;

    #[test]
    fn renders_frames() {
        init_logger();
        let mut emu = Emulator::new(
            Flags::default(),
            Rates {
                ips: Some(1000),
                frame_hz: 100,
                ..Default::default()
            },
        );
        emu.load_program_bytes(&CLS_LOOP).unwrap();
        let mut host = Headless::new().stop_after(50);
        assert_eq!(Exit::Stopped, emu.run(&mut host).unwrap());
        assert!(host.frames() > 0);
        assert!(host.last_frame().unwrap().is_blank());
    }

    #[test]
    fn key_wait_is_cancellable() {
        let mut emu = Emulator::default();
        // waitk v1; jmp 0x202
        emu.load_program_bytes(&[0xf1, 0x0a, 0x12, 0x02]).unwrap();
        let mut host = Headless::new().stop_after(5);
        assert_eq!(Exit::Cancelled, emu.run(&mut host).unwrap());
        assert_eq!(State::AwaitingKey, emu.state());
        assert_eq!(Some(1), emu.cpu().awaiting_key());
        // a later run picks the wait back up
        let mut host = Headless::new().press_at(1, 0xe).stop_after(3);
        assert_eq!(Exit::Stopped, emu.run(&mut host).unwrap());
        assert_eq!(0xe, emu.cpu().v()[1]);
    }

    #[test]
    fn timers_run_at_their_own_rate() {
        let mut emu = Emulator::default();
        #[rustfmt::skip]
        let rom = [
            0x60, 0xff, // mov #ff, v0
            0xf0, 0x15, // mov v0, DT
            0xf0, 0x18, // mov v0, ST
            0x12, 0x06, // jmp 0x206
        ];
        emu.load_program_bytes(&rom).unwrap();
        let mut host = Headless::new().stop_after(20);
        emu.run(&mut host).unwrap();
        // unbounded instructions, but the timers only count wall-clock time
        assert!(emu.cpu().cycle() >= 20 * 16);
        assert!(emu.cpu().delay() > 0xff - 60);
        assert!(emu.cpu().sound_active());
    }
}
