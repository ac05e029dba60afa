//! 密码凭据工具
//!
//! 生成或校验 `base64(salt).base64(key)` 格式的凭据，用于手工初始化账号。

use std::io::{self, BufRead};

use anyhow::{Context, bail};
use clap::Parser;
use consultorio_api::auth::{ITERATIONS, hash_password, verify_password};

#[derive(Debug, Parser)]
#[command(name = "hash-password", version, about = "生成或校验账号密码凭据")]
struct Cli {
    /// 明文密码，省略时从标准输入读取第一行
    password: Option<String>,

    /// 校验模式：检查密码是否与给定凭据匹配
    #[arg(long, value_name = "CREDENTIAL")]
    verify: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let password = match cli.password {
        Some(password) => password,
        None => read_password_from_stdin()?,
    };
    if password.is_empty() {
        bail!("密码不能为空");
    }

    match cli.verify {
        Some(credential) => {
            if verify_password(&credential, &password) {
                println!("ok");
            } else {
                println!("mismatch");
                std::process::exit(1);
            }
        }
        None => {
            let credential = hash_password(&password)?;
            eprintln!("PBKDF2-HMAC-SHA256, {} iterations", ITERATIONS);
            println!("{}", credential);
        }
    }

    Ok(())
}

fn read_password_from_stdin() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("读取标准输入失败")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
