/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

mod chain;
mod native;
mod options;
mod rect_packer;

pub fn init_logging() {
    drop(env_logger::try_init());
}
