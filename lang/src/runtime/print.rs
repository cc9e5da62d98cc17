//! Output sink for the `println` primitive.
//!
//! The interpreter never writes to stdout directly; it hands each line to a
//! `PrintHandler`, which either forwards it to stdout, captures it in a
//! buffer or drops it.

use std::{cell::RefCell, rc::Rc};

pub enum PrintHandler {
    Stdout,
    /// Every printed line, newline-terminated.
    Buffer(RefCell<String>),
    Silent,
}

impl PrintHandler {
    pub fn println(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => println!("{}", msg),
            PrintHandler::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(msg);
                buf.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    /// Captured output; always empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            PrintHandler::Buffer(buf) => buf.borrow().clone(),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let PrintHandler::Buffer(buf) = self {
            buf.borrow_mut().clear()
        }
    }
}

pub type SharedPrintHandler = Rc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Rc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Rc::new(PrintHandler::Buffer(RefCell::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Rc::new(PrintHandler::Silent)
}
