fn main() {
    tarrasch::uci::run();
}
