#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega4809::{Peripherals, PORTA};
    use avr_xmodem_boot::bootloader::{entry, Bootloader};
    use avr_xmodem_boot::config::{self, LAYOUT};
    use avr_xmodem_boot::hal::gpio::PortPin;
    use avr_xmodem_boot::hal::{system, Led, Nvmctrl, RxSense, Switch, Usart};
    use avr_xmodem_boot::logger::{Event, Logger};

    // USART0 on PA0/PA1, or PA4/PA5 when routed to the alternate pins
    #[cfg(not(feature = "alt-pins"))]
    const UART_TX: u8 = 0;
    #[cfg(not(feature = "alt-pins"))]
    const UART_RX: u8 = 1;
    #[cfg(feature = "alt-pins")]
    const UART_TX: u8 = 4;
    #[cfg(feature = "alt-pins")]
    const UART_RX: u8 = 5;

    const LED_PIN: u8 = 3; // PORTA
    const SWITCH_PIN: u8 = 7; // PORTA

    #[used]
    #[link_section = ".fuse"]
    static FUSES: [u8; 9] = config::FUSES;

    #[avr_device::entry]
    fn main() -> ! {
        // Sole owner from reset until the final jump or reset.
        let dp = unsafe { Peripherals::steal() };

        let nvm = Nvmctrl::new(dp.NVMCTRL);
        let mut switch = Switch::new(PORTA::ptr(), SWITCH_PIN);
        let mut delay = system::Delay;

        let reason = match entry::entry_reason(&nvm, &LAYOUT, &mut switch, &mut delay) {
            Some(reason) => reason,
            None => system::jump_to_application(config::BOOT_SIZE),
        };

        system::init_clock();
        #[cfg(feature = "alt-pins")]
        system::route_alt_pins();

        PortPin::new(PORTA::ptr(), UART_TX).make_output();
        let serial = Usart::new(dp.USART0, config::UART_BAUD_REG);
        let activity = RxSense::new(PORTA::ptr(), UART_RX);
        let led = Led::new(PORTA::ptr(), LED_PIN);

        #[cfg(feature = "debug")]
        let sink = {
            // USART1 TX on PC0
            PortPin::new(avr_device::atmega4809::PORTC::ptr(), 0).make_output();
            Usart::new(dp.USART1, config::UART_BAUD_REG)
        };
        #[cfg(not(feature = "debug"))]
        let sink = avr_xmodem_boot::logger::Discard;

        let mut boot = Bootloader::new(serial, nvm, activity, led, Logger::new(sink));
        boot.log().system(Event::Entry(reason));

        // Nothing in here gives up on its own; an error only means the flag
        // stays unprogrammed and the next reset lands back here.
        let _ = boot.update(&mut || false);

        entry::wait_for_release(&mut switch);
        system::soft_reset()
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
