fn main() {
    poolshare::main();
}
